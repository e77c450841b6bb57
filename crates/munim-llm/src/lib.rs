//! Language model layer.
//!
//! One engine, two backends: an on-device model when the hardware
//! supports it, otherwise a cloud chat completions endpoint. The choice
//! is made once at startup and holds for the session.

pub mod client;
pub mod engine;
pub mod local;
pub mod prompt;

pub use client::ChatClient;
pub use engine::{Backend, LlmEngine};
pub use local::{LocalModel, LocalModelLoader, MockLocalModel, MockLoader, UnsupportedLoader};
pub use prompt::SYSTEM_PROMPT;
