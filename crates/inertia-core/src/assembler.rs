//! # Page Assembler
//!
//! The render pipeline, strictly ordered:
//!
//! 1. overlay request props on shared props
//! 2. fold pending error messages into an `Always` `errors` prop
//! 3. filter a copy for partial reloads
//! 4. re-apply `Always` props from the unfiltered set
//! 5. evaluate the filtered copy
//! 6. plan deferred groups and merge lists from the *unfiltered* set
//!
//! Step 6 deliberately reads a different snapshot than the one rendered: the
//! client must learn about a deferred group even though its props were just
//! filtered out of a first load.

use crate::evaluate::evaluate_props;
use crate::messages::{ErrorMessageMap, ErrorMessages, resolve_errors};
use crate::page::Page;
use crate::partial::{ReloadRequest, filter_props, reinstate_always};
use crate::planner::{resolve_deferred_groups, resolve_merge_props};
use crate::types::{InertiaError, Props};

// =============================================================================
// INPUTS
// =============================================================================

/// Request-level facts the page is assembled against.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// Partial-reload state of the request.
    pub reload: &'a ReloadRequest,
    /// Request URL (path and query).
    pub url: String,
    /// Current asset version.
    pub version: String,
    /// History-encryption flag.
    pub encrypt_history: bool,
    /// One-shot clear-history flag.
    pub clear_history: bool,
}

/// Pending error messages for this render.
#[derive(Debug)]
pub struct PendingErrors<'a> {
    /// Messages persisted in the session by an earlier request.
    pub session: Option<ErrorMessages>,
    /// Messages collected during this request. Drained by the render.
    pub request: &'a ErrorMessageMap,
    /// Error bag to nest the messages under.
    pub bag: Option<&'a str>,
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Assemble the page for `component`.
pub fn assemble_page(
    component: &str,
    shared: &Props,
    props: Props,
    errors: PendingErrors<'_>,
    ctx: PageContext<'_>,
) -> Result<Page, InertiaError> {
    let mut merged = shared.clone();
    merged.extend(props);

    resolve_errors(&mut merged, errors.session, errors.request, errors.bag);

    let reload = ctx.reload;
    let is_partial = reload.is_partial(component);

    let mut rendered = filter_props(&merged, is_partial, &reload.only, &reload.except);
    reinstate_always(&merged, &mut rendered);

    let evaluated = evaluate_props(rendered)?;

    let deferred_props = resolve_deferred_groups(&merged, is_partial);
    let plan = resolve_merge_props(&merged, reload);

    Ok(Page {
        component: component.to_string(),
        props: evaluated,
        url: ctx.url,
        version: ctx.version,
        encrypt_history: ctx.encrypt_history,
        clear_history: ctx.clear_history,
        deferred_props,
        merge_props: plan.merge_props,
        deep_merge_props: plan.deep_merge_props,
        match_props_on: plan.match_props_on,
    })
}

// =============================================================================
// TESTS
// =============================================================================
