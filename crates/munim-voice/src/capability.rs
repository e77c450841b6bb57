//! Speech capture and synthesis capability traits.
//!
//! The session talks to one capture interface and one synthesis interface;
//! the concrete backend is chosen once at construction. The mock
//! implementations record every call so tests can assert ordering.

use std::sync::{Arc, Mutex};

use munim_core::{MunimError, Result};

/// Why a capture attempt ended without a usable transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFault {
    /// Nothing was said before the recognizer gave up. Recoverable.
    NoSpeech,
    /// Microphone permission was denied. Terminal.
    PermissionDenied,
    /// The recognizer lost its network backend. Terminal.
    Network,
    /// Anything else the backend reports.
    Other,
}

impl CaptureFault {
    /// Terminal faults end the session; recoverable ones restart it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureFault::PermissionDenied | CaptureFault::Network)
    }
}

/// One utterance handed to the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Speech-to-text capture backend.
pub trait SpeechCapture {
    /// Begin capturing in the given locale. `continuous` keeps the
    /// recognizer open across pauses and delivers interim fragments.
    fn start(&self, locale: &str, continuous: bool) -> Result<()>;

    /// Stop capturing. Idempotent.
    fn stop(&self) -> Result<()>;

    fn is_available(&self) -> bool;
}

/// Text-to-speech synthesis backend.
pub trait SpeechSynthesis {
    fn speak(&self, utterance: &Utterance) -> Result<()>;

    /// Cancel any in-flight utterance. Idempotent.
    fn cancel(&self) -> Result<()>;

    fn is_available(&self) -> bool;
}

// =============================================================================
// Mocks
// =============================================================================

/// Call log entry for [`MockSpeechCapture`].
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureCall {
    Start { locale: String, continuous: bool },
    Stop,
}

/// Recording capture mock for session tests.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechCapture {
    calls: Arc<Mutex<Vec<CaptureCall>>>,
    unavailable: bool,
    fail_start: bool,
}

impl MockSpeechCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CaptureCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CaptureCall::Start { .. }))
            .count()
    }
}

impl SpeechCapture for MockSpeechCapture {
    fn start(&self, locale: &str, continuous: bool) -> Result<()> {
        if self.fail_start {
            return Err(MunimError::Capture("Mock capture start failure".to_string()));
        }
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(CaptureCall::Start {
                locale: locale.to_string(),
                continuous,
            });
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(CaptureCall::Stop);
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }
}

/// Call log entry for [`MockSpeechSynthesis`].
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisCall {
    Speak(Utterance),
    Cancel,
}

/// Recording synthesis mock for session tests.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechSynthesis {
    calls: Arc<Mutex<Vec<SynthesisCall>>>,
    unavailable: bool,
}

impl MockSpeechSynthesis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SynthesisCall::Speak(u) => Some(u.text),
                SynthesisCall::Cancel => None,
            })
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SynthesisCall::Cancel))
            .count()
    }
}

impl SpeechSynthesis for MockSpeechSynthesis {
    fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(SynthesisCall::Speak(utterance.clone()));
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(SynthesisCall::Cancel);
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_faults() {
        assert!(CaptureFault::PermissionDenied.is_terminal());
        assert!(CaptureFault::Network.is_terminal());
        assert!(!CaptureFault::NoSpeech.is_terminal());
        assert!(!CaptureFault::Other.is_terminal());
    }

    #[test]
    fn test_mock_capture_records_calls() {
        let capture = MockSpeechCapture::new();
        capture.start("hi-IN", true).unwrap();
        capture.stop().unwrap();

        assert_eq!(
            capture.calls(),
            vec![
                CaptureCall::Start {
                    locale: "hi-IN".to_string(),
                    continuous: true
                },
                CaptureCall::Stop,
            ]
        );
    }

    #[test]
    fn test_mock_capture_unavailable() {
        assert!(!MockSpeechCapture::unavailable().is_available());
        assert!(MockSpeechCapture::new().is_available());
    }

    #[test]
    fn test_mock_capture_failing_start() {
        let capture = MockSpeechCapture::failing();
        assert!(capture.start("hi-IN", true).is_err());
        assert!(capture.calls().is_empty());
    }

    #[test]
    fn test_mock_synthesis_records_cancel_order() {
        let synth = MockSpeechSynthesis::new();
        synth.cancel().unwrap();
        synth
            .speak(&Utterance {
                text: "Namaste".to_string(),
                locale: "hi-IN".to_string(),
                rate: 0.9,
                pitch: 1.0,
            })
            .unwrap();

        let calls = synth.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], SynthesisCall::Cancel);
        assert_eq!(synth.spoken_texts(), vec!["Namaste".to_string()]);
    }

    #[test]
    fn test_mock_clone_shares_call_log() {
        let capture = MockSpeechCapture::new();
        let handle = capture.clone();
        capture.start("en-IN", false).unwrap();
        assert_eq!(handle.start_count(), 1);
    }
}
