//! Command helpers

pub mod logging;
pub mod notifier;
