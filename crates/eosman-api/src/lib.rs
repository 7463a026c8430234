// eosman-api: Async Rust client for the Arista EOS command API (eAPI)

pub mod eapi;
pub mod error;
pub mod transport;

pub use eapi::{EapiClient, OutputFormat};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
