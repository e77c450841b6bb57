//! Dialogue router and conversation session manager.

pub mod router;
pub mod session;

pub use router::{DialogueRouter, PendingAction, Reply};
pub use session::{ConversationManager, TurnOutcome};
