//! OAuth2 provider services.

pub mod access;
pub mod application;
pub mod authorization;
pub mod token;
pub mod userinfo;

pub use access::AccessService;
pub use application::ApplicationService;
pub use authorization::{AuthorizationService, CodeError};
pub use token::TokenService;
pub use userinfo::UserInfoService;
