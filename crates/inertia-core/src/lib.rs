//! # inertia-core
//!
//! The page-resolution engine for the Inertia protocol.
//!
//! A handler hands over a component name and a set of props; this crate turns
//! them into the page object a client router consumes, honouring partial
//! reloads, lazy and deferred props, merge intent and validation errors.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no HTTP framework types
//! - Deterministic: every key list on the wire is derived from a `BTreeMap`
//! - Stateless: each render reads its inputs and returns a fresh `Page`
//!
//! HTTP concerns (headers in, status and cookies out) live in the adapter crate
//! and only reach this one as plain strings and flags.

// =============================================================================
// MODULES
// =============================================================================

pub mod assembler;
pub mod evaluate;
pub mod messages;
pub mod page;
pub mod partial;
pub mod planner;
pub mod prop;
pub mod protocol;
pub mod types;
pub mod version;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{BoxError, InertiaError, Props};

// =============================================================================
// RE-EXPORTS: Props & Resolution
// =============================================================================

pub use assembler::{PageContext, PendingErrors, assemble_page};
pub use evaluate::{evaluate_prop, evaluate_props};
pub use page::Page;
pub use partial::{ReloadRequest, filter_props, reinstate_always};
pub use planner::{MergePlan, resolve_deferred_groups, resolve_merge_props};
pub use prop::{DEFAULT_DEFER_GROUP, DeferredProp, MergeProp, Mergeable, Prop, Resolver};

// =============================================================================
// RE-EXPORTS: Messages & Versioning
// =============================================================================

pub use messages::{
    ERRORS_PROP, ErrorMessageMap, ErrorMessages, SESSION_ERRORS_KEY, parse_session_errors,
    resolve_errors, session_errors_value,
};
pub use version::{VersionSource, manifest_fingerprint};
