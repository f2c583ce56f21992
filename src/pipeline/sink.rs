//! Speech sinks and the terminal station that drives them.

use crate::output::render_pass;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::SpokenUtterance;

/// Pluggable destination for completed passes.
///
/// Pairs with `AudioSource` on the input side: the sink decides what
/// happens to a finished pass (play it, collect it, print it).
pub trait SpeechSink: Send + 'static {
    /// Handle one completed pass.
    fn handle(&mut self, utterance: &SpokenUtterance) -> crate::error::Result<()>;

    /// Called on pipeline shutdown. Return accumulated text if applicable.
    fn finish(&mut self) -> Option<String> {
        None
    }

    /// Name for logging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Collects translated text for later retrieval (tests, daemon status).
#[derive(Default)]
pub struct CollectorSink {
    lines: Vec<String>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechSink for CollectorSink {
    fn handle(&mut self, utterance: &SpokenUtterance) -> crate::error::Result<()> {
        self.lines.push(utterance.translated.clone());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.lines.join("\n"))
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Writes translated text to stdout, one line per pass.
#[derive(Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechSink for StdoutSink {
    fn handle(&mut self, utterance: &SpokenUtterance) -> crate::error::Result<()> {
        println!("{}", utterance.translated);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Station wrapper around any `SpeechSink`.
///
/// Renders the pass on stderr (unless quiet), then hands it to the sink.
/// On shutdown the sink's accumulated result is sent to the pipeline
/// handle over `result_tx`.
pub(crate) struct SinkStation {
    sink: Box<dyn SpeechSink>,
    quiet: bool,
    result_tx: Option<crossbeam_channel::Sender<Option<String>>>,
}

impl SinkStation {
    pub(crate) fn new(
        sink: Box<dyn SpeechSink>,
        quiet: bool,
        result_tx: crossbeam_channel::Sender<Option<String>>,
    ) -> Self {
        Self {
            sink,
            quiet,
            result_tx: Some(result_tx),
        }
    }
}

impl Station for SinkStation {
    type Input = SpokenUtterance;
    type Output = ();

    fn process(&mut self, utterance: SpokenUtterance) -> Result<Option<()>, StationError> {
        if !self.quiet {
            render_pass(&utterance.original, &utterance.translated);
        }

        match self.sink.handle(&utterance) {
            Ok(()) => Ok(Some(())),
            Err(e) => Err(StationError::recoverable(format!(
                "{}: {}",
                self.sink.name(),
                e
            ))),
        }
    }

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn shutdown(&mut self) {
        let result = self.sink.finish();
        if let Some(tx) = self.result_tx.take() {
            if tx.send(result).is_err() {
                eprintln!("voxlate: sink shutdown result receiver already dropped");
            }
        }
    }
}
