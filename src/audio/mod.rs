//! Audio capture: microphone and push-transport sources.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod listener;
pub mod push;
pub mod recorder;

pub use listener::{ListenerConfig, UtteranceListener};
pub use push::{FrameSender, PushAudioSource};
pub use recorder::{AudioSource, MockAudioSource};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Audio backend probing (capture and playback alike) triggers harmless
/// but noisy ALSA/JACK messages.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` on fd 2. Safe as long as no other thread
/// is concurrently manipulating stderr.
pub(crate) fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
        }
        if devnull >= 0 {
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    #[test]
    fn suppressed_stderr_passes_the_result_through() {
        assert_eq!(with_suppressed_stderr(|| 42), 42);
    }

    #[test]
    fn repeated_suppression_does_not_leak_descriptors() {
        let before = std::fs::File::open("/dev/null").unwrap();
        for _ in 0..64 {
            with_suppressed_stderr(|| ());
        }
        let after = std::fs::File::open("/dev/null").unwrap();
        // A leaked fd per call would push the second fd number far up.
        assert!(after.as_raw_fd() < before.as_raw_fd() + 32);
    }
}
