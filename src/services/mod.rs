//! External collaborators: speech-to-text, translation, text-to-speech.
//!
//! Each collaborator is a trait so the pipeline can run against HTTP
//! implementations in production and stubs in tests.

pub mod google;
pub mod recognizer;
pub mod synthesizer;
pub mod translator;

pub use google::{GoogleRecognizer, GoogleSynthesizer, GoogleTranslator};
pub use recognizer::{MockRecognizer, Recognizer};
pub use synthesizer::{MockSynthesizer, Synthesizer};
pub use translator::{MockTranslator, Translator};
