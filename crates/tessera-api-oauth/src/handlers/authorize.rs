//! Authorization endpoint handler.
//!
//! The ordering here is load-bearing: the client and its redirect URI are
//! validated before anything is redirected anywhere. A request with an
//! unknown client or an unregistered redirect URI gets a direct error
//! response - redirecting it would turn this endpoint into an open
//! redirector. Only once the redirect target is known-good do protocol
//! errors travel back to the client as redirect parameters.

use crate::error::OAuthError;
use crate::models::AuthorizationRequest;
use crate::router::OAuthState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tessera_api_sso::session::current_user;
use tessera_db::models::User;

/// OAuth2 authorization endpoint.
#[utoipa::path(
    get,
    path = "/oauth/authorize",
    params(AuthorizationRequest),
    responses(
        (status = 302, description = "Redirect to the client with a code, or into the login flow"),
        (status = 400, description = "Invalid client or redirect URI (rendered directly, never redirected)"),
    ),
    tag = "OAuth2"
)]
pub async fn authorize_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizationRequest>,
) -> Result<Response, OAuthError> {
    // 1. Resolve the client and validate the redirect target. Failures
    //    here must NOT redirect to the (unverified) redirect_uri.
    let application = state
        .applications
        .get_active_by_client_id(&request.client_id)
        .await
        .map_err(|_| OAuthError::InvalidClient("Unknown client_id".to_string()))?;

    if !application.redirect_uri_registered(&request.redirect_uri) {
        tracing::warn!(
            client_id = %request.client_id,
            redirect_uri = %request.redirect_uri,
            "Authorization rejected: redirect_uri not registered"
        );
        return Err(OAuthError::InvalidRequest(
            "redirect_uri does not match any registered redirect URI".to_string(),
        ));
    }

    // 2. Require a session; otherwise detour through federation and come
    //    back here with every original query parameter preserved.
    let user = match current_user(&state.pool, &headers, &state.session).await? {
        Some(user) => user,
        None => return Ok(login_detour(&request)),
    };

    // 3. From here on the redirect target is validated; protocol errors
    //    go back to the client per RFC 6749.
    if request.response_type != "code" {
        return Ok(error_redirect(
            &request,
            "unsupported_response_type",
            None,
        ));
    }

    let code_challenge_method = match normalize_pkce(&request) {
        Ok(method) => method,
        Err(description) => {
            return Ok(error_redirect(&request, "invalid_request", Some(description)));
        }
    };

    // 4. Access decision: denial is access_denied at the client, not a
    //    generic failure page.
    if !state.access.is_authorized(&user, &application).await? {
        tracing::info!(
            user_id = %user.id,
            application_id = %application.id,
            "Authorization denied by access policy"
        );
        return Ok(error_redirect(&request, "access_denied", None));
    }

    // 5. Mint the code and send it home.
    let code = state
        .codes
        .issue(
            user.id,
            &application,
            &request.redirect_uri,
            request.scopes(),
            request.state.as_deref(),
            request.code_challenge.as_deref(),
            code_challenge_method,
        )
        .await?;

    audit_issued(&user, &request);

    let mut params = vec![("code", code)];
    if let Some(state_value) = &request.state {
        params.push(("state", state_value.clone()));
    }

    Ok(redirect_with_params(&request.redirect_uri, &params))
}

/// Redirect into the federation flow, returning here afterwards.
fn login_detour(request: &AuthorizationRequest) -> Response {
    let mut original = vec![
        ("response_type", request.response_type.clone()),
        ("client_id", request.client_id.clone()),
        ("redirect_uri", request.redirect_uri.clone()),
    ];
    if let Some(scope) = &request.scope {
        original.push(("scope", scope.clone()));
    }
    if let Some(state) = &request.state {
        original.push(("state", state.clone()));
    }
    if let Some(challenge) = &request.code_challenge {
        original.push(("code_challenge", challenge.clone()));
        if let Some(method) = &request.code_challenge_method {
            original.push(("code_challenge_method", method.clone()));
        }
    }

    let return_url = format!(
        "/oauth/authorize?{}",
        serde_urlencoded::to_string(original).unwrap_or_default()
    );
    let login_url = format!(
        "/auth/sso/login?{}",
        serde_urlencoded::to_string([("redirect_to", return_url)]).unwrap_or_default()
    );

    found_redirect(&login_url)
}

/// Build a 302 Found redirect (the conventional status for OAuth2
/// redirects; axum's `Redirect` helpers only produce 303/307/308).
fn found_redirect(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!(location = %location, error = %e, "Redirect target is not a valid header value");
            OAuthError::Internal("Invalid redirect target".to_string()).into_response()
        }
    }
}

/// Validate the PKCE parameters, defaulting the method to "plain" when a
/// challenge arrives without one.
fn normalize_pkce(request: &AuthorizationRequest) -> Result<Option<&str>, String> {
    match (&request.code_challenge, &request.code_challenge_method) {
        (None, _) => Ok(None),
        (Some(_), None) => Ok(Some("plain")),
        (Some(_), Some(method)) if method == "S256" || method == "plain" => {
            Ok(Some(method.as_str()))
        }
        (Some(_), Some(_)) => Err("invalid code_challenge_method".to_string()),
    }
}

/// Redirect back to the validated client redirect URI with error
/// parameters.
fn error_redirect(
    request: &AuthorizationRequest,
    error: &str,
    description: Option<String>,
) -> Response {
    let mut params = vec![("error", error.to_string())];
    if let Some(description) = description {
        params.push(("error_description", description));
    }
    if let Some(state) = &request.state {
        params.push(("state", state.clone()));
    }
    redirect_with_params(&request.redirect_uri, &params)
}

/// Append query parameters to a validated redirect URI.
fn redirect_with_params<V: AsRef<str>>(redirect_uri: &str, params: &[(&str, V)]) -> Response {
    match url::Url::parse(redirect_uri) {
        Ok(mut url) => {
            {
                let mut query = url.query_pairs_mut();
                for (key, value) in params {
                    query.append_pair(key, value.as_ref());
                }
            }
            found_redirect(url.as_str())
        }
        Err(e) => {
            // Registered URIs are operator-entered; an unparsable one is a
            // configuration fault, not a protocol error.
            tracing::error!(redirect_uri = %redirect_uri, error = %e, "Registered redirect URI is not a valid URL");
            OAuthError::Internal("Invalid registered redirect URI".to_string()).into_response()
        }
    }
}

fn audit_issued(user: &User, request: &AuthorizationRequest) {
    tracing::info!(
        user_id = %user.id,
        client_id = %request.client_id,
        scope = %request.scope.as_deref().unwrap_or("openid"),
        "Authorization code issued"
    );
}
