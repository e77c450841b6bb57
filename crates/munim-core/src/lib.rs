pub mod config;
pub mod error;
pub mod types;

pub use config::MunimConfig;
pub use error::{MunimError, Result};
pub use types::*;
