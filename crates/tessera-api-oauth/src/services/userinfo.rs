//! UserInfo claims assembly.

use crate::models::UserInfoResponse;
use tessera_db::models::User;

/// Assembles userinfo claims filtered by granted scopes. Stateless: the
/// token service already resolved the user while validating the token.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserInfoService;

impl UserInfoService {
    /// Build the claims document for a user, scoped to the token's grant.
    ///
    /// `sub` is always included. `email` requires the `email` scope; the
    /// name/department/group claims require `profile`.
    #[must_use]
    pub fn claims_for(user: &User, scopes: &[String]) -> UserInfoResponse {
        let has = |scope: &str| scopes.iter().any(|s| s == scope);

        let mut response = UserInfoResponse {
            sub: user.id.to_string(),
            email: None,
            name: None,
            preferred_username: None,
            given_name: None,
            family_name: None,
            department: None,
            groups: None,
        };

        if has("email") {
            response.email = Some(user.email.clone());
        }

        if has("profile") {
            response.name = Some(user.display_name.clone());
            response.preferred_username = Some(user.email.clone());
            response.given_name = user.first_name.clone();
            response.family_name = user.last_name.clone();
            response.department = user.department.clone();
            response.groups = Some(user.sso_groups.clone());
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            sso_id: "subj".to_string(),
            email: "mina@corp.example".to_string(),
            display_name: "Mina Okafor".to_string(),
            first_name: Some("Mina".to_string()),
            last_name: Some("Okafor".to_string()),
            department: Some("Platform".to_string()),
            job_title: None,
            sso_groups: vec!["plat-all".to_string()],
            is_active: true,
            is_admin: false,
            is_super_admin: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_openid_only_yields_sub_only() {
        let user = sample_user();
        let claims = UserInfoService::claims_for(&user, &["openid".to_string()]);

        assert_eq!(claims.sub, user.id.to_string());
        assert!(claims.email.is_none());
        assert!(claims.name.is_none());
        assert!(claims.groups.is_none());
    }

    #[test]
    fn test_email_scope_adds_email() {
        let user = sample_user();
        let claims =
            UserInfoService::claims_for(&user, &["openid".to_string(), "email".to_string()]);

        assert_eq!(claims.email.as_deref(), Some("mina@corp.example"));
        assert!(claims.name.is_none());
    }

    #[test]
    fn test_profile_scope_adds_identity_claims() {
        let user = sample_user();
        let claims =
            UserInfoService::claims_for(&user, &["openid".to_string(), "profile".to_string()]);

        assert_eq!(claims.name.as_deref(), Some("Mina Okafor"));
        assert_eq!(claims.preferred_username.as_deref(), Some("mina@corp.example"));
        assert_eq!(claims.department.as_deref(), Some("Platform"));
        assert_eq!(claims.groups.as_deref(), Some(&["plat-all".to_string()][..]));
        // email scope not granted
        assert!(claims.email.is_none());
    }
}
