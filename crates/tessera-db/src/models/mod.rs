//! Entity models with their queries.

pub mod access_grant;
pub mod application;
pub mod authorization_code;
pub mod oauth_token;
pub mod sso_login_session;
pub mod user;
pub mod user_group;

pub use access_grant::AccessGrant;
pub use application::{Application, ApplicationStatus, CreateApplication};
pub use authorization_code::{AuthorizationCode, NewAuthorizationCode};
pub use oauth_token::{NewOAuthToken, OAuthToken};
pub use sso_login_session::SsoLoginSession;
pub use user::{UpsertUserFromSso, User};
pub use user_group::UserGroup;
