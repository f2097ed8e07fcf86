//! OAuth2 endpoint handlers.

pub mod admin;
pub mod applications;
pub mod authorize;
pub mod client_auth;
pub mod discovery;
pub mod revocation;
pub mod token;
pub mod userinfo;

pub use admin::{
    admin_create_application_handler, admin_delete_application_handler,
    admin_grant_access_handler, admin_list_tokens_handler, admin_purge_handler,
    admin_regenerate_secret_handler, admin_revoke_access_handler,
};
pub use applications::list_applications_handler;
pub use authorize::authorize_handler;
pub use client_auth::extract_client_credentials;
pub use discovery::discovery_handler;
pub use revocation::revoke_token_handler;
pub use token::token_handler;
pub use userinfo::userinfo_handler;
