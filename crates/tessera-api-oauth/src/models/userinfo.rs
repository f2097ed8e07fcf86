//! UserInfo endpoint model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims returned by `GET /oauth/userinfo`, filtered by granted scopes.
///
/// `sub` is always present; `email` requires the `email` scope; the name,
/// department and group fields require `profile`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfoResponse {
    /// Subject: the user's stable id.
    pub sub: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted() {
        let response = UserInfoResponse {
            sub: "abc".to_string(),
            email: None,
            name: None,
            preferred_username: None,
            given_name: None,
            family_name: None,
            department: None,
            groups: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, "{\"sub\":\"abc\"}");
    }
}
