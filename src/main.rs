use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use voxlate::cli::{Cli, Commands, ConfigAction};
use voxlate::config::{Config, TranslationFailurePolicy};
use voxlate::daemon::run_daemon;
use voxlate::ipc::client::send_command;
use voxlate::ipc::protocol::{Command, Response};
use voxlate::ipc::server::IpcServer;
use voxlate::languages::supported_languages;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_cli_overrides(&mut config, &cli);
            run_translate(config, cli.quiet, cli.verbose, cli.once).await?;
        }
        Some(Commands::Languages) => {
            list_languages();
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Daemon { ref socket }) => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_cli_overrides(&mut config, &cli);
            run_daemon(config, socket.clone(), cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Start { socket }) => {
            handle_ipc_command(socket, Command::Start).await?;
        }
        Some(Commands::Stop { socket }) => {
            handle_ipc_command(socket, Command::Stop).await?;
        }
        Some(Commands::Toggle { socket }) => {
            handle_ipc_command(socket, Command::Toggle).await?;
        }
        Some(Commands::Status { socket }) => {
            handle_ipc_command(socket, Command::Status).await?;
        }
        Some(Commands::SetLanguages {
            source,
            target,
            socket,
        }) => {
            handle_ipc_command(socket, Command::SetLanguages { source, target }).await?;
        }
        Some(Commands::Shutdown { socket }) => {
            handle_ipc_command(socket, Command::Shutdown).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "voxlate", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voxlate/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else if let Some(default_path) = Config::default_path() {
        Config::load_or_default(&default_path)?
    } else {
        Config::default()
    };

    Ok(config.with_env_overrides())
}

/// Fold command-line flags into the loaded configuration.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(source) = &cli.source {
        config.languages.source = source.clone();
    }
    if let Some(target) = &cli.target {
        config.languages.target = target.clone();
    }
    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.audio.listen_timeout_secs = timeout;
    }
    if let Some(phrase_limit) = cli.phrase_limit {
        config.audio.phrase_limit_secs = phrase_limit;
    }
    if cli.no_playback {
        config.output.playback = false;
    }
    if cli.placeholder_on_error {
        config.output.on_translation_error = TranslationFailurePolicy::Placeholder;
    }
}

/// Foreground translation on the microphone: run until Ctrl-C, or for a
/// single pass with --once.
#[cfg(feature = "cpal-audio")]
async fn run_translate(config: Config, quiet: bool, verbose: u8, once: bool) -> Result<()> {
    voxlate::audio::capture::suppress_audio_warnings();

    let (source, target) = config.language_pair();
    if !quiet {
        eprintln!(
            "voxlate: translating {} -> {}",
            source.cyan(),
            target.green()
        );
    }
    if verbose > 0 {
        eprintln!(
            "voxlate: device={} timeout={}s phrase_limit={}s playback={}",
            config.audio.device.as_deref().unwrap_or("default"),
            config.audio.listen_timeout_secs,
            config.audio.phrase_limit_secs,
            config.output.playback
        );
    }
    if verbose > 1 {
        eprint!("{}", toml::to_string_pretty(&config)?);
    }

    if once {
        let mut microphone = voxlate::app::open_microphone(&config)?;
        match voxlate::app::run_single_pass(&config, quiet, microphone.as_mut()) {
            Ok(()) => {}
            Err(e) if e.is_no_speech() => {
                eprintln!("voxlate: no speech detected");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let handle = voxlate::app::start_session(&config, quiet, verbose)?;
    if !quiet {
        eprintln!("voxlate: listening, press Ctrl-C to stop");
    }

    tokio::signal::ctrl_c().await?;
    if !quiet {
        eprintln!("\nvoxlate: stopping");
    }
    let _ = handle.stop();
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
async fn run_translate(_config: Config, _quiet: bool, _verbose: u8, _once: bool) -> Result<()> {
    eprintln!("voxlate: built without microphone capture support");
    std::process::exit(1);
}

/// List the language vocabulary, one name/code pair per line.
fn list_languages() {
    println!("Supported languages:");
    for name in supported_languages() {
        println!("  {:<20} {}", name, voxlate::languages::language_code(name));
    }
}

/// List available audio input devices.
#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = voxlate::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    eprintln!("voxlate: built without microphone capture support");
    std::process::exit(1);
}

/// Send one command to the daemon and render the response.
async fn handle_ipc_command(socket: Option<std::path::PathBuf>, command: Command) -> Result<()> {
    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);
    let response = send_command(&socket_path, command).await?;

    match response {
        Response::Ok => {}
        Response::Message { text } => {
            println!("{}", text);
        }
        Response::Status {
            translating,
            source_language,
            target_language,
        } => {
            let state = if translating {
                "translating".green().to_string()
            } else {
                "idle".dimmed().to_string()
            };
            println!("{}", state);
            println!("languages: {} -> {}", source_language, target_language);
        }
        Response::Error { message } => {
            eprintln!("{} {}", "error:".red(), message);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Handle config inspection commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => match custom_path {
            Some(path) => println!("{}", path.display()),
            None => match Config::default_path() {
                Some(path) => println!("{}", path.display()),
                None => {
                    eprintln!("voxlate: no config directory available");
                    std::process::exit(1);
                }
            },
        },
    }
    Ok(())
}
