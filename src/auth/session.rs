use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::db::UserRecord;
use crate::error::AuthError;

use super::flash::{self, FLASH_COOKIE, Flash};

pub const SESSION_COOKIE: &str = "session";

/// The signed-in user, as recovered from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: i64,
    pub user_name: String,
}

/// Derive the cookie signing key from the configured secret.
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Start a session for a user whose credentials were already verified.
pub fn create_session(jar: SignedCookieJar, user: &UserRecord) -> SignedCookieJar {
    let identity = UserIdentity {
        user_id: user.id,
        user_name: user.name.clone(),
    };
    let value = serde_urlencoded::to_string(&identity).unwrap_or_default();

    jar.add(
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Drop the session and any pending notices. Safe to call without a session.
pub fn destroy_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
        .remove(Cookie::build(FLASH_COOKIE).path("/"))
}

pub fn require_session(jar: &SignedCookieJar) -> Result<UserIdentity, AuthError> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| serde_urlencoded::from_str::<UserIdentity>(cookie.value()).ok())
        .ok_or(AuthError::Unauthenticated)
}

/// Where to send an unauthenticated request so login can resume `path`.
pub fn login_url(path: &str) -> String {
    match serde_urlencoded::to_string([("next", path)]) {
        Ok(query) => format!("/login?{}", query),
        Err(_) => "/login".to_string(),
    }
}

/// Only same-site absolute paths are honoured as post-login destinations.
///
/// Control characters are refused outright: browsers drop tabs and newlines
/// while parsing a `Location`, so `/\t/host` would resolve to `//host`.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        !n.chars().any(|c| c.is_ascii_control())
            && n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
    })
}

/// Guard for protected routes. Places the [`UserIdentity`] in the request
/// extensions, or redirects to the login page remembering the requested path.
pub async fn session_guard(jar: SignedCookieJar, mut request: Request, next: Next) -> Response {
    match require_session(&jar) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!("Rejected unauthenticated request to {}", request.uri().path());
            let jar = flash::push(jar, Flash::warning(err.to_string()));
            (jar, Redirect::to(&login_url(request.uri().path()))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRecord {
        UserRecord {
            id: 42,
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            created_at: String::new(),
        }
    }

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(signing_key("test-secret"))
    }

    #[test]
    fn created_session_resolves_to_user() {
        let jar = create_session(jar(), &user());
        assert_eq!(
            require_session(&jar),
            Ok(UserIdentity {
                user_id: 42,
                user_name: "Ada Lovelace".into(),
            })
        );
    }

    #[test]
    fn no_session_is_unauthenticated() {
        assert_eq!(require_session(&jar()), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn destroy_is_idempotent() {
        let jar = destroy_session(create_session(jar(), &user()));
        assert_eq!(require_session(&jar), Err(AuthError::Unauthenticated));

        let jar = destroy_session(jar);
        assert_eq!(require_session(&jar), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn signing_key_is_stable_per_secret() {
        assert_eq!(signing_key("a").master(), signing_key("a").master());
        assert_ne!(signing_key("a").master(), signing_key("b").master());
    }

    #[test]
    fn login_url_preserves_path() {
        assert_eq!(login_url("/predict"), "/login?next=%2Fpredict");
    }

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(safe_next(Some("/predict")), Some("/predict"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn control_characters_are_never_followed() {
        assert_eq!(safe_next(Some("/\t/evil.example")), None);
        assert_eq!(safe_next(Some("/\n/evil.example")), None);
        assert_eq!(safe_next(Some("/predict\nx")), None);
        assert_eq!(safe_next(Some("/predict\r\nSet-Cookie: x=1")), None);
        assert_eq!(safe_next(Some("/predict\u{7f}")), None);
    }

    #[test]
    fn repeated_guard_rejections_queue_one_notice() {
        let jar = flash::push(jar(), Flash::warning(AuthError::Unauthenticated.to_string()));
        let jar = flash::push(jar, Flash::warning(AuthError::Unauthenticated.to_string()));
        let (_, flashes) = flash::take(jar);
        assert_eq!(flashes.len(), 1);
    }
}
