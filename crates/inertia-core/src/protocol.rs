//! # Protocol Constants and Decisions
//!
//! Header names, the clear-history cookie name and the two pure status
//! decisions the adapter makes around a handler: forcing a full reload on an
//! asset-version mismatch, and turning a 302 after PUT/PATCH/DELETE into a 303.
//!
//! Header names are lowercase so they can be fed straight into
//! `HeaderName::from_static`.

// =============================================================================
// HEADERS
// =============================================================================

/// Marks a request (and its JSON response) as protocol-aware.
pub const HEADER_INERTIA: &str = "x-inertia";
/// Nests validation errors under a named bag.
pub const HEADER_ERROR_BAG: &str = "x-inertia-error-bag";
/// Target of a client-side full visit (409 responses).
pub const HEADER_LOCATION: &str = "x-inertia-location";
/// The asset version the client was built against.
pub const HEADER_VERSION: &str = "x-inertia-version";
/// Component a partial reload targets.
pub const HEADER_PARTIAL_COMPONENT: &str = "x-inertia-partial-component";
/// Comma-separated keys a partial reload wants.
pub const HEADER_PARTIAL_DATA: &str = "x-inertia-partial-data";
/// Comma-separated keys a partial reload does not want.
pub const HEADER_PARTIAL_EXCEPT: &str = "x-inertia-partial-except";
/// Comma-separated keys to replace instead of merge.
pub const HEADER_RESET: &str = "x-inertia-reset";

// =============================================================================
// COOKIES
// =============================================================================

/// Default name of the one-shot cookie carrying a clear-history request
/// across a redirect.
pub const CLEAR_HISTORY_COOKIE: &str = "inertia_clear_history";

// =============================================================================
// STATUS CODES
// =============================================================================

/// Status used to ask the client for a full page visit.
pub const STATUS_CONFLICT: u16 = 409;
/// Plain redirect.
pub const STATUS_FOUND: u16 = 302;
/// Redirect that forces the follow-up request to be a GET.
pub const STATUS_SEE_OTHER: u16 = 303;

/// Methods whose 302 redirects are rewritten to 303.
const NON_IDEMPOTENT_REDIRECT_METHODS: [&str; 3] = ["PUT", "PATCH", "DELETE"];

// =============================================================================
// DECISIONS
// =============================================================================

/// Split a comma-separated header value into keys, dropping empty entries.
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a protocol request was built against stale assets.
///
/// Only GET requests are checked. A missing client version counts as empty.
pub fn is_version_stale(
    is_inertia: bool,
    method: &str,
    client_version: Option<&str>,
    server_version: &str,
) -> bool {
    is_inertia && method == "GET" && client_version.unwrap_or_default() != server_version
}

/// Final status for a response to a protocol request.
///
/// A 302 answering PUT/PATCH/DELETE becomes 303 so the browser follows it
/// with a GET. Everything else is left alone.
pub fn normalize_redirect_status(is_inertia: bool, method: &str, status: u16) -> u16 {
    if is_inertia && status == STATUS_FOUND && NON_IDEMPOTENT_REDIRECT_METHODS.contains(&method) {
        STATUS_SEE_OTHER
    } else {
        status
    }
}

// =============================================================================
// TESTS
// =============================================================================
