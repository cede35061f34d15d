//! Bundled document lookup

mod resolver;

pub use resolver::FsAssetResolver;
