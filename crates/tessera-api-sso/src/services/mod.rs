//! Federation services.

pub mod discovery;
pub mod federation;
pub mod jwks;

pub use discovery::DiscoveryService;
pub use federation::FederationService;
pub use jwks::JwksClient;
