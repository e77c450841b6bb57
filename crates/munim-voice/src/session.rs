//! Voice session: wires capture, synthesis, the phase machine, and the
//! commit debounce into one object.
//!
//! Timing is driven by the caller. The session never reads the clock
//! itself; `now` is passed into every time-sensitive call and the owner
//! polls `poll_commit` / `poll_resume` from its event loop.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use munim_core::config::VoiceConfig;
use munim_core::types::Language;
use munim_core::{MunimError, Result};
use munim_intent::strip_control_tokens;

use crate::capability::{CaptureFault, SpeechCapture, SpeechSynthesis, Utterance};
use crate::debounce::CommitDebouncer;
use crate::phase::{PhaseMachine, VoicePhase};

pub struct VoiceSession<C: SpeechCapture, S: SpeechSynthesis> {
    capture: C,
    synthesis: S,
    phases: PhaseMachine,
    config: VoiceConfig,
    language: Language,
    debouncer: CommitDebouncer,
    /// Accumulated final fragments awaiting commit.
    transcript: String,
    /// The user asked to listen and has not asked to stop.
    active: bool,
    /// Scheduled capture restart after an utterance or capture end.
    resume_at: Option<Instant>,
}

impl<C: SpeechCapture, S: SpeechSynthesis> VoiceSession<C, S> {
    pub fn new(capture: C, synthesis: S, config: VoiceConfig, language: Language) -> Self {
        let debouncer = CommitDebouncer::new(Duration::from_millis(config.debounce_ms));
        Self {
            capture,
            synthesis,
            phases: PhaseMachine::new(),
            config,
            language,
            debouncer,
            transcript: String::new(),
            active: false,
            resume_at: None,
        }
    }

    pub fn phase(&self) -> VoicePhase {
        self.phases.current()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin (or resume) listening.
    ///
    /// A no-op when capture is unavailable. If an utterance is in flight
    /// it is cancelled synchronously before capture starts.
    pub fn start_listening(&mut self, _now: Instant) -> Result<()> {
        if !self.capture.is_available() {
            warn!("Speech capture unavailable, ignoring listen request");
            return Ok(());
        }

        match self.phases.current() {
            VoicePhase::Listening => return Ok(()),
            VoicePhase::Speaking => {
                self.synthesis.cancel()?;
                self.phases.transition(VoicePhase::Listening)?;
            }
            VoicePhase::Idle => {
                self.phases.transition(VoicePhase::Listening)?;
            }
            VoicePhase::Thinking => {
                return Err(MunimError::Voice(
                    "Cannot start listening while a reply is being prepared".to_string(),
                ));
            }
        }

        self.resume_at = None;
        self.active = true;
        self.capture
            .start(self.language.locale_code(), self.config.continuous)?;
        info!(locale = self.language.locale_code(), "Listening started");
        Ok(())
    }

    /// Feed one recognizer fragment into the session.
    ///
    /// Any speech while Speaking barges in and cancels the utterance.
    /// Only final fragments accumulate; each one restarts the commit
    /// deadline.
    pub fn on_capture_result(&mut self, fragment: &str, is_final: bool, now: Instant) -> Result<()> {
        if self.phases.current() == VoicePhase::Speaking {
            debug!("Barge-in: user speech interrupts utterance");
            self.synthesis.cancel()?;
            self.phases.transition(VoicePhase::Listening)?;
        }

        if is_final {
            let fragment = fragment.trim();
            if !fragment.is_empty() {
                if !self.transcript.is_empty() {
                    self.transcript.push(' ');
                }
                self.transcript.push_str(fragment);
            }
            self.debouncer.arm(now);
        }
        Ok(())
    }

    /// Commit the accumulated transcript once the debounce window has
    /// passed with no newer final fragment.
    pub fn poll_commit(&mut self, now: Instant) -> Result<Option<String>> {
        if !self.debouncer.is_due(now) {
            return Ok(None);
        }
        self.debouncer.clear();

        if self.transcript.is_empty() {
            return Ok(None);
        }

        let committed = std::mem::take(&mut self.transcript);
        self.phases.transition(VoicePhase::Thinking)?;
        info!(chars = committed.len(), "Transcript committed");
        Ok(Some(committed))
    }

    /// Handle a capture fault from the recognizer.
    ///
    /// `NoSpeech` restarts capture silently while the session is active.
    /// Terminal faults end the session and surface as errors.
    pub fn on_capture_error(&mut self, fault: CaptureFault) -> Result<()> {
        match fault {
            CaptureFault::NoSpeech => {
                if self.active && self.phases.current() == VoicePhase::Listening {
                    debug!("No speech detected, restarting capture");
                    self.capture
                        .start(self.language.locale_code(), self.config.continuous)?;
                }
                Ok(())
            }
            CaptureFault::PermissionDenied => {
                self.end_listening()?;
                Err(MunimError::Capture(
                    "Microphone permission denied".to_string(),
                ))
            }
            CaptureFault::Network => {
                self.end_listening()?;
                Err(MunimError::Capture(
                    "Speech recognition lost its network backend".to_string(),
                ))
            }
            CaptureFault::Other => {
                self.end_listening()?;
                Err(MunimError::Capture("Speech capture failed".to_string()))
            }
        }
    }

    /// The recognizer closed on its own (pause, backend recycle).
    ///
    /// In continuous mode a restart is scheduled after the resume delay
    /// unless an utterance is in flight.
    pub fn on_capture_end(&mut self, now: Instant) {
        if self.active
            && self.config.continuous
            && self.phases.current() != VoicePhase::Speaking
        {
            self.resume_at = Some(now + Duration::from_millis(self.config.resume_delay_ms));
        }
    }

    /// Restart capture when a scheduled resume has come due.
    pub fn poll_resume(&mut self, now: Instant) -> Result<bool> {
        let Some(at) = self.resume_at else {
            return Ok(false);
        };
        if now < at {
            return Ok(false);
        }
        self.resume_at = None;

        if !self.active {
            return Ok(false);
        }
        match self.phases.current() {
            VoicePhase::Listening => {
                self.capture
                    .start(self.language.locale_code(), self.config.continuous)?;
                Ok(true)
            }
            VoicePhase::Idle => {
                self.start_listening(now)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Speak a reply.
    ///
    /// Control tokens are stripped before synthesis and never spoken.
    /// Any in-flight utterance is cancelled first; the last caller wins.
    /// When nothing reaches the synthesizer (empty reply, synthesis
    /// unavailable) the turn completes immediately, as if the utterance
    /// had finished.
    pub fn speak(&mut self, text: &str, now: Instant) -> Result<()> {
        let spoken = strip_control_tokens(text);
        if spoken.is_empty() {
            debug!("Reply was control tokens only, nothing to speak");
            return self.finish_turn_unspoken(now);
        }
        if !self.synthesis.is_available() {
            warn!("Speech synthesis unavailable, dropping utterance");
            return self.finish_turn_unspoken(now);
        }

        self.synthesis.cancel()?;
        if self.phases.current() == VoicePhase::Thinking {
            self.phases.transition(VoicePhase::Speaking)?;
        }
        self.synthesis.speak(&Utterance {
            text: spoken,
            locale: self.language.locale_code().to_string(),
            rate: self.config.rate,
            pitch: self.config.pitch,
        })
    }

    /// Close out a turn whose reply never reached the synthesizer.
    ///
    /// No `on_speech_end` callback will arrive, so the session must not
    /// sit in Speaking waiting for one. Returns to Idle and schedules the
    /// listening resume itself.
    fn finish_turn_unspoken(&mut self, now: Instant) -> Result<()> {
        if self.phases.current() == VoicePhase::Thinking {
            self.phases.transition(VoicePhase::Speaking)?;
            self.phases.transition(VoicePhase::Idle)?;
        }
        if self.active && self.config.continuous {
            self.resume_at = Some(now + Duration::from_millis(self.config.resume_delay_ms));
        }
        Ok(())
    }

    /// The synthesizer finished (or failed) the current utterance.
    ///
    /// Either way the session returns to Idle and, in continuous mode,
    /// schedules a listening resume.
    pub fn on_speech_end(&mut self, now: Instant) -> Result<()> {
        if self.phases.current() == VoicePhase::Speaking {
            self.phases.transition(VoicePhase::Idle)?;
        }
        if self.active && self.config.continuous {
            self.resume_at = Some(now + Duration::from_millis(self.config.resume_delay_ms));
        }
        Ok(())
    }

    /// Stop listening and discard any uncommitted transcript.
    pub fn stop_listening(&mut self) -> Result<()> {
        self.end_listening()
    }

    fn end_listening(&mut self) -> Result<()> {
        self.active = false;
        self.resume_at = None;
        self.transcript.clear();
        self.debouncer.clear();
        self.capture.stop()?;
        if self.phases.current() == VoicePhase::Listening {
            self.phases.transition(VoicePhase::Idle)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
