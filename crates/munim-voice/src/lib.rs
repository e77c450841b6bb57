//! Voice interaction layer: phase machine, capture/synthesis capability
//! traits, and the session object that ties them together with the
//! final-fragment commit debounce and barge-in handling.

pub mod capability;
pub mod debounce;
pub mod phase;
pub mod session;

pub use capability::{
    CaptureFault, MockSpeechCapture, MockSpeechSynthesis, SpeechCapture, SpeechSynthesis,
    Utterance,
};
pub use debounce::CommitDebouncer;
pub use phase::{PhaseMachine, VoicePhase};
pub use session::VoiceSession;
