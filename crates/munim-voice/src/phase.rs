//! Voice phase machine with thread-safe transitions.
//!
//! Enforces valid transitions for the voice interaction lifecycle:
//! - Idle -> Listening (start listening)
//! - Listening -> Thinking (transcript committed)
//! - Thinking -> Speaking (reply ready, synthesis starting)
//! - Speaking -> Idle (utterance finished)
//! - Listening -> Idle (stop or terminal capture error)
//! - Speaking -> Listening (barge-in)

use std::fmt;
use std::sync::{Arc, Mutex};

use munim_core::MunimError;

/// Operational phase of the voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoicePhase {
    /// No interaction in progress. Ready to start.
    Idle,
    /// Actively capturing speech from the microphone.
    Listening,
    /// A committed transcript is being processed into a reply.
    Thinking,
    /// Speaking a reply through the synthesizer.
    Speaking,
}

impl fmt::Display for VoicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoicePhase::Idle => write!(f, "Idle"),
            VoicePhase::Listening => write!(f, "Listening"),
            VoicePhase::Thinking => write!(f, "Thinking"),
            VoicePhase::Speaking => write!(f, "Speaking"),
        }
    }
}

impl VoicePhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &VoicePhase) -> bool {
        matches!(
            (self, target),
            (VoicePhase::Idle, VoicePhase::Listening)
                | (VoicePhase::Listening, VoicePhase::Thinking)
                | (VoicePhase::Thinking, VoicePhase::Speaking)
                | (VoicePhase::Speaking, VoicePhase::Idle)
                // Stop / terminal capture error
                | (VoicePhase::Listening, VoicePhase::Idle)
                // Barge-in: user speech interrupts the utterance
                | (VoicePhase::Speaking, VoicePhase::Listening)
        )
    }
}

/// Thread-safe phase machine for the voice session.
///
/// All transitions are validated before being applied, returning an error
/// if the requested transition is not permitted.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Arc<Mutex<VoicePhase>>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    /// Create a new phase machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            phase: Arc::new(Mutex::new(VoicePhase::Idle)),
        }
    }

    /// Returns the current phase.
    pub fn current(&self) -> VoicePhase {
        *self.phase.lock().expect("phase mutex poisoned")
    }

    /// Attempt to transition to the target phase.
    pub fn transition(&self, target: VoicePhase) -> Result<(), MunimError> {
        let mut phase = self.phase.lock().expect("phase mutex poisoned");
        if phase.can_transition_to(&target) {
            tracing::debug!("Voice phase: {} -> {}", *phase, target);
            *phase = target;
            Ok(())
        } else {
            Err(MunimError::Voice(format!(
                "Invalid phase transition: {} -> {}",
                *phase, target
            )))
        }
    }

    /// Force the phase machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        let mut phase = self.phase.lock().expect("phase mutex poisoned");
        tracing::warn!("Voice phase machine reset to Idle from {}", *phase);
        *phase = VoicePhase::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================
