//! Platform integrations

mod browser;

pub use browser::SystemBrowserLauncher;
