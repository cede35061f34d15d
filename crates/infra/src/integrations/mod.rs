//! External service integrations

pub mod geoip;

pub use geoip::GeoIpClient;
