//! Federation request/response models and typed identity claims.

use crate::error::FederationError;
use serde::{Deserialize, Serialize};
use tessera_db::models::UpsertUserFromSso;

/// OIDC provider metadata (the subset tessera consumes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
}

/// Token endpoint response from the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTokenResponse {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Typed identity claims extracted from a verified ID token.
///
/// The loosely-typed claims document from the provider is validated at this
/// boundary: a missing subject fails fast with `FederationError` instead of
/// propagating into user-record construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    /// Subject: the provider's immutable user identifier.
    pub sub: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Department from the corporate directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Job title from the corporate directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Directory group names.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl IdentityClaims {
    /// Build typed claims from a verified ID-token payload.
    ///
    /// Call only after signature/issuer/audience/nonce validation. `sub` is
    /// mandatory; `email` falls back to empty (some providers omit it when
    /// the scope was not granted), everything else is optional.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, FederationError> {
        let sub = payload
            .get("sub")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(FederationError::MissingClaim("sub"))?
            .to_string();

        let str_claim = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let email = str_claim("email").unwrap_or_default();
        let name = str_claim("name")
            .or_else(|| str_claim("preferred_username"))
            .unwrap_or_else(|| email.clone());

        let groups = payload
            .get("groups")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|g| g.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            sub,
            email,
            name,
            given_name: str_claim("given_name"),
            family_name: str_claim("family_name"),
            department: str_claim("department"),
            job_title: str_claim("job_title").or_else(|| str_claim("title")),
            groups,
        })
    }

    /// Convert into the user-upsert input written on every login.
    #[must_use]
    pub fn into_upsert(self) -> UpsertUserFromSso {
        UpsertUserFromSso {
            sso_id: self.sub,
            email: self.email,
            display_name: self.name,
            first_name: self.given_name,
            last_name: self.family_name,
            department: self.department,
            job_title: self.job_title,
            sso_groups: self.groups,
        }
    }
}

/// Query parameters for `GET /auth/sso/login`.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Local path to return to after login. Defaults to "/".
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Query parameters for `GET /auth/sso/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

/// Response body for `GET /auth/check`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

/// User profile returned by `GET /auth/me`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: uuid::Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub groups: Vec<String>,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

impl From<tessera_db::models::User> for UserProfile {
    fn from(user: tessera_db::models::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            first_name: user.first_name,
            last_name: user.last_name,
            department: user.department,
            job_title: user.job_title,
            groups: user.sso_groups,
            is_admin: user.is_admin,
            is_super_admin: user.is_super_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_mapping_full_payload() {
        let payload = json!({
            "sub": "S-1-5-21-1234",
            "email": "anna@corp.example",
            "name": "Anna Lind",
            "given_name": "Anna",
            "family_name": "Lind",
            "department": "Finance",
            "title": "Controller",
            "groups": ["fin-all", "fin-controllers"],
        });

        let claims = IdentityClaims::from_payload(&payload).unwrap();
        assert_eq!(claims.sub, "S-1-5-21-1234");
        assert_eq!(claims.email, "anna@corp.example");
        assert_eq!(claims.name, "Anna Lind");
        assert_eq!(claims.job_title.as_deref(), Some("Controller"));
        assert_eq!(claims.groups, vec!["fin-all", "fin-controllers"]);
    }

    #[test]
    fn test_claims_mapping_missing_sub_fails_fast() {
        let payload = json!({ "email": "x@corp.example" });
        let err = IdentityClaims::from_payload(&payload).unwrap_err();
        assert!(matches!(err, FederationError::MissingClaim("sub")));
    }

    #[test]
    fn test_claims_mapping_empty_sub_fails_fast() {
        let payload = json!({ "sub": "" });
        assert!(IdentityClaims::from_payload(&payload).is_err());
    }

    #[test]
    fn test_claims_mapping_name_falls_back_to_email() {
        let payload = json!({ "sub": "abc", "email": "x@corp.example" });
        let claims = IdentityClaims::from_payload(&payload).unwrap();
        assert_eq!(claims.name, "x@corp.example");
    }

    #[test]
    fn test_into_upsert_carries_all_fields() {
        let payload = json!({
            "sub": "abc",
            "email": "x@corp.example",
            "name": "X",
            "department": "IT",
            "groups": ["it-all"],
        });
        let upsert = IdentityClaims::from_payload(&payload).unwrap().into_upsert();
        assert_eq!(upsert.sso_id, "abc");
        assert_eq!(upsert.department.as_deref(), Some("IT"));
        assert_eq!(upsert.sso_groups, vec!["it-all"]);
    }
}
