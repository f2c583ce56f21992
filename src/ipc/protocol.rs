//! JSON message protocol between the CLI and the daemon.

use serde::{Deserialize, Serialize};

/// Commands sent by the CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Flip the session flag: start translating if idle, stop if running.
    Toggle,
    /// Start a translation session.
    Start,
    /// Stop the current session.
    Stop,
    /// Query daemon state.
    Status,
    /// Change the language pair; takes effect on the next session start.
    SetLanguages { source: String, target: String },
    /// Shut the daemon down.
    Shutdown,
}

impl Command {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    /// Ok with a human-readable note (e.g. "already translating").
    Message { text: String },
    Status {
        translating: bool,
        source_language: String,
        target_language: String,
    },
    Error { message: String },
}

impl Response {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_variants_roundtrip() {
        let commands = vec![
            Command::Toggle,
            Command::Start,
            Command::Stop,
            Command::Status,
            Command::SetLanguages {
                source: "en".to_string(),
                target: "fr".to_string(),
            },
            Command::Shutdown,
        ];

        for cmd in commands {
            let json = cmd.to_json().expect("serialize");
            let back = Command::from_json(&json).expect("deserialize");
            assert_eq!(cmd, back, "roundtrip failed for {:?}", cmd);
        }
    }

    #[test]
    fn wire_format_is_tagged_snake_case() {
        assert_eq!(Command::Toggle.to_json().unwrap(), r#"{"type":"toggle"}"#);
        assert_eq!(Command::Status.to_json().unwrap(), r#"{"type":"status"}"#);

        let set = Command::SetLanguages {
            source: "en".to_string(),
            target: "es".to_string(),
        }
        .to_json()
        .unwrap();
        assert!(set.contains(r#""type":"set_languages""#));
        assert!(set.contains(r#""source":"en""#));
    }

    #[test]
    fn response_status_roundtrip() {
        let resp = Response::Status {
            translating: true,
            source_language: "en".to_string(),
            target_language: "es".to_string(),
        };
        let json = resp.to_json().unwrap();
        assert!(json.contains(r#""translating":true"#));
        assert_eq!(Response::from_json(&json).unwrap(), resp);
    }

    #[test]
    fn response_error_roundtrip_with_special_chars() {
        let resp = Response::Error {
            message: r#"socket "busy" (timeout)"#.to_string(),
        };
        let json = resp.to_json().unwrap();
        assert_eq!(Response::from_json(&json).unwrap(), resp);
    }

    #[test]
    fn unknown_command_type_is_rejected() {
        assert!(Command::from_json(r#"{"type":"reboot"}"#).is_err());
        assert!(Command::from_json(r#"{"no_type":true}"#).is_err());
        assert!(Command::from_json("not json").is_err());
    }
}
