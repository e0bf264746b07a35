use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;

/// Bearer token accepted on staff endpoints. An unset token locks those endpoints.
#[derive(Debug, Clone, Default)]
pub struct AdminGuard {
    token: Option<Arc<str>>,
}

impl AdminGuard {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .map(Arc::from),
        }
    }

    pub fn permits(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return false;
        };

        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| constant_time_eq(presented.trim(), expected))
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.bytes()
        .zip(right.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub(crate) async fn require_admin(
    State(guard): State<AdminGuard>,
    request: Request,
    next: Next,
) -> Response {
    if guard.permits(request.headers()) {
        next.run(request).await
    } else {
        ApiError::Unauthorized.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn matching_bearer_token_is_permitted() {
        let guard = AdminGuard::new(Some("s3cret".to_string()));
        assert!(guard.permits(&headers("Bearer s3cret")));
        assert!(!guard.permits(&headers("Bearer s3cre")));
        assert!(!guard.permits(&headers("s3cret")));
        assert!(!guard.permits(&HeaderMap::new()));
    }

    #[test]
    fn missing_token_locks_every_caller_out() {
        for guard in [AdminGuard::new(None), AdminGuard::new(Some("  ".to_string()))] {
            assert!(!guard.permits(&headers("Bearer ")));
            assert!(!guard.permits(&headers("Bearer anything")));
        }
    }
}
