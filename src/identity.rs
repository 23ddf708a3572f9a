//! Authenticated principal derived from verified claims.

use std::collections::HashMap;

use crate::jwt::ClaimSet;

/// Claim key holding the numeric user id.
pub const CLAIM_USER_ID: &str = "user.id";
/// Claim key holding the account code.
pub const CLAIM_ACCOUNT: &str = "user.code";
/// Claim key holding the display name.
pub const CLAIM_NAME: &str = "user.name";
/// Claim key holding the comma-separated role list.
pub const CLAIM_ROLES: &str = "roles";

/// Sentinel for string claims absent from the token.
pub const UNKNOWN: &str = "UNKNOWN";

/// The authenticated principal for one request.
///
/// Built once from the verified claim bag and owned by that request's
/// context; nothing mutates it afterwards and it is never shared across
/// requests. Construction is best-effort: absent claims fall back to
/// sentinels instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Numeric user id, `0` when the claim is absent
    pub user_id: i64,
    /// Account code, `"UNKNOWN"` when absent
    pub account: String,
    /// Display name, `"UNKNOWN"` when absent
    pub name: String,
    /// Role names in token order, empty when absent
    pub roles: Vec<String>,
    /// Free-form diagnostic fields added by the filter before binding
    pub extras: HashMap<String, String>,
}

impl Identity {
    /// Map a verified claim bag into an identity.
    pub fn from_claims(claims: &ClaimSet) -> Self {
        Self {
            user_id: claims
                .get(CLAIM_USER_ID)
                .and_then(|id| id.parse().ok())
                .unwrap_or(0),
            account: claims.get(CLAIM_ACCOUNT).unwrap_or(UNKNOWN).to_string(),
            name: claims.get(CLAIM_NAME).unwrap_or(UNKNOWN).to_string(),
            roles: split_roles(claims.get(CLAIM_ROLES).unwrap_or("")),
            extras: HashMap::new(),
        }
    }

    /// Whether the principal holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether the principal holds every one of the given roles.
    pub fn has_all_roles(&self, roles: &[&str]) -> bool {
        roles.iter().all(|role| self.has_role(role))
    }
}

/// Split a comma-separated role claim. An empty claim yields no roles.
fn split_roles(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}
