//! Authenticated principal extraction and authorization helpers.
//!
//! Protected handlers read the `Authorization: Bearer` header, verify the
//! token signature and expiry, and get back a principal. No store lookup:
//! the token itself carries identity and role.

use axum::http::{header, HeaderMap};

use super::error::AuthError;
use super::state::AuthState;
use super::types::Role;

/// Authenticated user context derived from a bearer token.
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    pub user_id: uuid::Uuid,
    pub role: Role,
}

/// Pull the raw token out of the `Authorization` header, if well formed.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve a bearer token into a principal, or 401 for missing/invalid/expired
/// tokens. All three failure modes share one message so the response does not
/// reveal which check failed.
pub fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::Unauthenticated)?;
    let claims = state
        .codec()
        .verify(token)
        .map_err(|_| AuthError::Unauthenticated)?;
    Ok(Principal {
        user_id: claims.sub,
        role: claims.role,
    })
}

/// Gate for administrative routes.
pub fn require_admin(principal: &Principal) -> Result<(), AuthError> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::User => Err(AuthError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::hasher::Hasher;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::api::handlers::auth::token::TokenCodec;
    use crate::api::notify::Notifiers;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn state() -> AuthState {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        let codec = TokenCodec::new(b"test-secret", 3600);
        AuthState::new(config, Hasher::default(), codec, Notifiers::log_only())
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn extract_bearer_token_parses_header() {
        let headers = bearer_headers("abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn extract_bearer_token_rejects_other_schemes_and_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert_eq!(extract_bearer_token(&headers), None);

        let headers = bearer_headers("");
        assert_eq!(extract_bearer_token(&headers), None);

        let headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn require_auth_round_trips_claims() {
        let state = state();
        let user_id = Uuid::new_v4();
        let Ok(token) = state.codec().issue(user_id, Role::Admin) else {
            panic!("issue failed");
        };

        let headers = bearer_headers(&token);
        let Ok(principal) = require_auth(&headers, &state) else {
            panic!("require_auth failed");
        };
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn require_auth_rejects_missing_and_garbage_tokens() {
        let state = state();

        let headers = HeaderMap::new();
        assert!(matches!(
            require_auth(&headers, &state),
            Err(AuthError::Unauthenticated)
        ));

        let headers = bearer_headers("not-a-token");
        assert!(matches!(
            require_auth(&headers, &state),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn require_admin_gates_on_role() {
        let admin = Principal {
            user_id: Uuid::nil(),
            role: Role::Admin,
        };
        assert!(require_admin(&admin).is_ok());

        let user = Principal {
            user_id: Uuid::nil(),
            role: Role::User,
        };
        assert!(matches!(require_admin(&user), Err(AuthError::Forbidden)));
    }
}
