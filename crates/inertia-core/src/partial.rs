//! # Partial-Reload Filter
//!
//! Decides which keys of a merged property set are rendered for this request.
//!
//! - First load: every `Lazy`/`Optional`/`Deferred` prop is dropped.
//! - Partial reload with `only`: keep the intersection with present keys.
//! - Partial reload with `except`: remove those keys afterwards.
//! - In every branch, `Always` props from the unfiltered set come back.

use crate::protocol::split_keys;
use crate::types::Props;

// =============================================================================
// RELOAD REQUEST
// =============================================================================

/// Partial-reload state read once from the request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadRequest {
    /// Component the reload targets. Empty means this is not a partial reload.
    pub component: String,
    /// Keys the client asked for.
    pub only: Vec<String>,
    /// Keys the client asked to leave out.
    pub except: Vec<String>,
    /// Keys to replace instead of merge.
    pub reset: Vec<String>,
}

impl ReloadRequest {
    /// Build from raw header values; absent headers are `None`.
    pub fn from_header_values(
        component: Option<&str>,
        only: Option<&str>,
        except: Option<&str>,
        reset: Option<&str>,
    ) -> Self {
        Self {
            component: component.unwrap_or_default().to_string(),
            only: only.map(split_keys).unwrap_or_default(),
            except: except.map(split_keys).unwrap_or_default(),
            reset: reset.map(split_keys).unwrap_or_default(),
        }
    }

    /// Whether this request is a partial reload of `component`.
    pub fn is_partial(&self, component: &str) -> bool {
        !self.component.is_empty() && self.component == component
    }

    /// Whether the client asked to reset `key`.
    pub fn is_reset(&self, key: &str) -> bool {
        self.reset.iter().any(|k| k == key)
    }

    /// Whether `key` survives the only/except lists.
    pub fn wants(&self, key: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|k| k == key))
            && !self.except.iter().any(|k| k == key)
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// Filter a property set for rendering.
pub fn filter_props(props: &Props, is_partial: bool, only: &[String], except: &[String]) -> Props {
    let mut filtered = if !is_partial {
        let mut first_load = props.clone();
        first_load.retain(|_, prop| !prop.ignores_first_load());
        first_load
    } else if !only.is_empty() {
        only.iter()
            .filter_map(|key| props.get(key).map(|prop| (key.clone(), prop.clone())))
            .collect()
    } else {
        props.clone()
    };

    if is_partial {
        for key in except {
            filtered.remove(key);
        }
    }

    reinstate_always(props, &mut filtered);
    filtered
}

/// Copy every `Always` prop of `original` into `filtered`.
pub fn reinstate_always(original: &Props, filtered: &mut Props) {
    for (key, prop) in original.iter() {
        if prop.is_always() {
            filtered.insert(key.clone(), prop.clone());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
