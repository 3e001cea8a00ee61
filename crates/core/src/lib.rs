//! Shared foundation for the glint renderer workspace.
//!
//! Provides the pieces every other crate leans on:
//! - Error type and result alias for app-level plumbing
//! - Logging initialization
//! - Frame timer

mod error;
mod logging;
mod timer;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
