//! Station-based translation pipeline.
//!
//! Audio flows capture → recognize → translate → synthesize → sink, one
//! thread per station, bounded channels in between. A pass is one
//! utterance making that trip.

pub mod error;
pub mod orchestrator;
pub mod recognize;
pub mod sink;
pub mod station;
pub mod synthesize;
pub mod translate;
pub mod types;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use orchestrator::{CaptureMode, Pipeline, PipelineConfig, PipelineHandle};
pub use recognize::RecognizeStation;
pub use sink::{CollectorSink, SpeechSink, StdoutSink};
pub use station::{Station, StationRunner};
pub use synthesize::SynthesizeStation;
pub use translate::TranslateStation;
pub use types::{CapturedUtterance, RecognizedUtterance, SpokenUtterance, TranslatedUtterance};
