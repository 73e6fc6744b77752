//! # Merge & Defer Planner
//!
//! Computes the page metadata that tells the client what to do besides
//! replacing props: which deferred groups to fetch next, and which props to
//! merge (shallow or deep, optionally matching array items on fields).
//!
//! Both plans read the property set *before* filtering and evaluation. A first
//! load has to announce deferred groups whose props it just filtered out.

use crate::partial::ReloadRequest;
use crate::prop::{Mergeable, Prop};
use crate::types::Props;
use std::collections::BTreeMap;

// =============================================================================
// DEFERRED GROUPS
// =============================================================================

/// Group name → deferred prop keys.
///
/// Empty on partial reloads: by then the client already knows the groups and
/// is fetching them.
pub fn resolve_deferred_groups(props: &Props, is_partial: bool) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if is_partial {
        return groups;
    }

    for (key, prop) in props.iter() {
        if let Prop::Deferred(deferred) = prop {
            groups
                .entry(deferred.group_name().to_string())
                .or_default()
                .push(key.clone());
        }
    }
    groups
}

// =============================================================================
// MERGE PLAN
// =============================================================================

/// The three merge lists of a page.
///
/// Callers should rely on membership only, never on order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Keys to shallow-merge.
    pub merge_props: Vec<String>,
    /// Keys to deep-merge.
    pub deep_merge_props: Vec<String>,
    /// `"key.field"` pairs used to match array items.
    pub match_props_on: Vec<String>,
}

/// Build the merge plan for a property set.
pub fn resolve_merge_props(props: &Props, reload: &ReloadRequest) -> MergePlan {
    let mut plan = MergePlan::default();

    for (key, prop) in props.iter() {
        let Some(mergeable) = prop.mergeable() else {
            continue;
        };
        if !mergeable.should_merge() {
            continue;
        }
        // reset asks for replacement on this request
        if reload.is_reset(key) {
            continue;
        }
        if !reload.wants(key) {
            continue;
        }

        plan.push(key, mergeable);
    }

    plan
}

impl MergePlan {
    fn push(&mut self, key: &str, mergeable: &dyn Mergeable) {
        if mergeable.should_deep_merge() {
            self.deep_merge_props.push(key.to_string());
        } else {
            self.merge_props.push(key.to_string());
        }

        for field in mergeable.matches_on() {
            self.match_props_on.push(format!("{key}.{field}"));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
