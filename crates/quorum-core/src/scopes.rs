//! Access Policy Gate: maps free-text permission requests to scopes
//!
//! Pure substring containment against a fixed vocabulary; case-sensitive,
//! unrecognized input yields an empty set rather than an error.

/// Scope granting read access to the API.
pub const SCOPE_READ: &str = "Auth.Read";

/// Scope granting write access to the API.
pub const SCOPE_WRITE: &str = "Auth.Write";

/// Compute the scope set for a free-text permission request.
///
/// Each scope is added at most once by construction.
pub fn compute_scopes(permission_request: &str) -> Vec<String> {
    let mut scopes = Vec::new();
    if permission_request.contains("read") {
        scopes.push(SCOPE_READ.to_string());
    }
    if permission_request.contains("write") {
        scopes.push(SCOPE_WRITE.to_string());
    }
    scopes
}
