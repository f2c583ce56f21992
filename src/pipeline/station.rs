//! Station abstraction and the runner that hosts each station on a thread.

use crate::pipeline::error::{ErrorReporter, StationError};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One processing stage of the pipeline.
///
/// Stations run on their own threads, connected by bounded channels.
/// A pass moves downstream only when the station produces output for it.
pub trait Station: Send + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Process one input.
    ///
    /// `Ok(Some(output))` forwards the pass, `Ok(None)` drops it quietly,
    /// `Err(Recoverable)` drops it and reports, `Err(Fatal)` stops the
    /// station.
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError>;

    /// Station name for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called once when the input channel closes or a fatal error hit.
    fn shutdown(&mut self) {}
}

/// Hosts one station on a dedicated thread.
pub struct StationRunner {
    handle: Option<JoinHandle<()>>,
    station_name: &'static str,
}

impl StationRunner {
    /// Spawn `station` reading from `input_rx` and writing to `output_tx`.
    ///
    /// The thread exits when the input channel disconnects, the output
    /// channel disconnects, or the station returns a fatal error. The
    /// station's `shutdown` runs in all three cases.
    pub fn spawn<S: Station>(
        mut station: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();

        let handle = thread::spawn(move || {
            while let Ok(input) = input_rx.recv() {
                match station.process(input) {
                    Ok(Some(output)) => {
                        if output_tx.send(output).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err @ StationError::Recoverable(_)) => {
                        error_reporter.report(station.name(), &err);
                    }
                    Err(err @ StationError::Fatal(_)) => {
                        error_reporter.report(station.name(), &err);
                        break;
                    }
                }
            }
            station.shutdown();
        });

        Self {
            handle: Some(handle),
            station_name,
        }
    }

    /// Wait for the station thread to finish.
    pub fn join(mut self) -> Result<(), String> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| format!("station '{}' thread panicked", self.station_name)),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.station_name
    }
}
