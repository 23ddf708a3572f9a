//! Demo endpoints exercising the filter end to end.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::context::RequestContext;

/// Identity view returned by `/whoami`.
#[derive(Debug, Serialize)]
pub struct IdentityView {
    pub user_id: i64,
    pub account: String,
    pub name: String,
    pub roles: Vec<String>,
}

/// Create the demo router: an index on the always-exempt root, a liveness
/// probe (a natural exclusion target), and an identity echo.
pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/whoami", get(whoami))
}

async fn index() -> &'static str {
    "beargate"
}

async fn health() -> &'static str {
    "OK"
}

/// Echo the authenticated identity. The extractor rejects with 401 when
/// no identity was bound, which only happens on bypassed requests.
async fn whoami(context: RequestContext) -> Json<IdentityView> {
    let identity = context.identity();
    Json(IdentityView {
        user_id: identity.user_id,
        account: identity.account.clone(),
        name: identity.name.clone(),
        roles: identity.roles.clone(),
    })
}
