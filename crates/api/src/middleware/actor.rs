//! Actor identity from the auth gateway.
//!
//! Authentication happens upstream; the gateway forwards the caller's user
//! id in the `x-actor-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;
use estimo_shared::AppError;

/// Header carrying the authenticated user's id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The calling user, if the gateway identified one.
///
/// Use this in handlers to stamp `created_by`/`updated_by`:
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let created_by = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor(pub Option<Uuid>);

impl Actor {
    /// Returns the user ID, if present.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Self(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(|id| Self(Some(id)))
            .ok_or_else(|| {
                AppError::Validation(format!("{ACTOR_HEADER} must be a UUID")).into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(header: Option<&str>) -> Result<Actor, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        assert_eq!(extract(None).await.unwrap(), Actor(None));
    }

    #[tokio::test]
    async fn test_valid_header_is_parsed() {
        let id = Uuid::new_v4();
        let actor = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(actor.user_id(), Some(id));
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        let err = extract(Some("not-a-uuid")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
