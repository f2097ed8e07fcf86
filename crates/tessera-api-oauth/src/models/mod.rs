//! OAuth2 request and response models.

pub mod application;
pub mod authorize;
pub mod discovery;
pub mod revocation;
pub mod token;
pub mod userinfo;

pub use application::*;
pub use authorize::*;
pub use discovery::*;
pub use revocation::*;
pub use token::*;
pub use userinfo::*;
