//! SSO and session endpoint handlers.

use crate::error::FederationError;
use crate::models::{AuthCheckResponse, CallbackQuery, LoginQuery, UserProfile};
use crate::router::SsoState;
use crate::session::{
    clear_session_cookie, current_user, is_secure_request, issue_session, set_session_cookie,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Build a 302 Found redirect (the conventional status for login-flow
/// redirects; axum's `Redirect` helpers only produce 303/307/308).
fn found_redirect(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!(location = %location, error = %e, "Redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Redirect the browser to the corporate identity provider.
#[utoipa::path(
    get,
    path = "/auth/sso/login",
    params(("redirect_to" = Option<String>, Query, description = "Local path to return to after login")),
    responses((status = 302, description = "Redirect to the identity provider")),
    tag = "Auth"
)]
pub async fn sso_login_handler(
    State(state): State<SsoState>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, FederationError> {
    let redirect = state
        .federation
        .begin_login(query.redirect_to.as_deref())
        .await?;

    Ok(found_redirect(&redirect.url))
}

/// Identity provider callback: complete the login and set the session
/// cookie.
#[utoipa::path(
    get,
    path = "/auth/sso/callback",
    params(
        ("code" = String, Query, description = "Authorization code from the provider"),
        ("state" = String, Query, description = "State issued at login start"),
    ),
    responses(
        (status = 302, description = "Redirect back into the application with the session cookie set"),
        (status = 401, description = "Login failed"),
    ),
    tag = "Auth"
)]
pub async fn sso_callback_handler(
    State(state): State<SsoState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, FederationError> {
    let (user, return_to) = state
        .federation
        .complete_login(&query.code, &query.state)
        .await?;

    let token = issue_session(&user, &state.session)
        .map_err(|e| FederationError::Internal(format!("session issuance failed: {e}")))?;

    let secure = is_secure_request(&headers, state.session.trust_forwarded_proto);

    let mut response = found_redirect(&return_to);
    set_session_cookie(response.headers_mut(), &token, &state.session, secure);

    Ok(response)
}

/// Clear the session cookie.
///
/// Sessions are self-contained and short-lived; logout clears the cookie
/// without any server-side token state to revoke.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 302, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout_handler(State(state): State<SsoState>, headers: HeaderMap) -> Response {
    let secure = is_secure_request(&headers, state.session.trust_forwarded_proto);

    let mut response = found_redirect("/");
    if let Ok(value) = clear_session_cookie(secure).parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Current user profile, or 401 when unauthenticated.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "Auth"
)]
pub async fn auth_me_handler(State(state): State<SsoState>, headers: HeaderMap) -> Response {
    match current_user(&state.pool, &headers, &state.session).await {
        Ok(Some(user)) => Json(UserProfile::from(user)).into_response(),
        Ok(None) => crate::error::SessionError::Invalid.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve session user");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Lightweight authentication probe.
#[utoipa::path(
    get,
    path = "/auth/check",
    responses((status = 200, description = "Authentication state", body = AuthCheckResponse)),
    tag = "Auth"
)]
pub async fn auth_check_handler(State(state): State<SsoState>, headers: HeaderMap) -> Response {
    match current_user(&state.pool, &headers, &state.session).await {
        Ok(user) => Json(AuthCheckResponse {
            authenticated: user.is_some(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve session user");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Development-only login bypass.
///
/// Accepts a role selector instead of real federation. The route exists
/// only in `dev-login` builds and refuses to run unless the deployment is
/// in development mode.
#[cfg(feature = "dev-login")]
pub async fn dev_login_handler(
    State(state): State<SsoState>,
    headers: HeaderMap,
    Json(request): Json<DevLoginRequest>,
) -> Response {
    use tessera_db::models::{UpsertUserFromSso, User};

    if !state.session.development_mode {
        tracing::warn!("Dev login attempted outside development mode");
        return StatusCode::NOT_FOUND.into_response();
    }

    let (sso_id, email, is_admin) = match request.role.as_str() {
        "admin" => ("dev-admin", "dev-admin@localhost", true),
        _ => ("dev-user", "dev-user@localhost", false),
    };

    let user = match User::upsert_from_sso(
        &state.pool,
        UpsertUserFromSso {
            sso_id: sso_id.to_string(),
            email: email.to_string(),
            display_name: format!("Dev {}", request.role),
            first_name: None,
            last_name: None,
            department: Some("Development".to_string()),
            job_title: None,
            sso_groups: vec![],
        },
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Dev login upsert failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if is_admin && !user.is_admin {
        if let Err(e) = sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(&state.pool)
            .await
        {
            tracing::error!(error = %e, "Dev login role update failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let token = match issue_session(&user, &state.session) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Dev login session issuance failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let secure = is_secure_request(&headers, state.session.trust_forwarded_proto);
    let mut response = StatusCode::NO_CONTENT.into_response();
    set_session_cookie(response.headers_mut(), &token, &state.session, secure);
    response
}

/// Request body for the development login bypass.
#[cfg(feature = "dev-login")]
#[derive(Debug, serde::Deserialize)]
pub struct DevLoginRequest {
    /// "admin" or "user".
    pub role: String,
}
