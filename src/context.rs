//! Request-scoped identity binding.
//!
//! The filter binds at most one context per request into the request
//! extensions. Handlers pull it back out with the extractors below;
//! a handler running without a binding is on a bypassed request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::identity::Identity;

/// Immutable, request-scoped binding carrying the authenticated identity
/// to downstream handlers.
///
/// Cloning the handle shares the same identity; nothing can replace an
/// identity once bound.
#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Arc<Identity>,
}

impl RequestContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Required-context extractor: rejects with `401 Unauthorized` when no
/// identity was bound for this request.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Optional-context extractor: `None` on bypassed requests.
impl<S> OptionalFromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<RequestContext>().cloned())
    }
}
