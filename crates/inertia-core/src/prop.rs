//! # Property Variants
//!
//! A response prop is one of a closed set of variants. Each variant decides two
//! things: when (and whether) its value is computed, and what it advertises to
//! the client besides its value.
//!
//! | Variant    | Evaluation              | First load                     |
//! |------------|-------------------------|--------------------------------|
//! | `Value`    | identity                | always sent                    |
//! | `Provider` | callback, every render  | always sent                    |
//! | `Lazy`     | callback                | skipped unless requested       |
//! | `Optional` | callback                | skipped unless requested       |
//! | `Deferred` | callback                | skipped, announced by group    |
//! | `Always`   | unwraps inner           | always sent, survives filters  |
//! | `Merge`    | unwraps inner           | normal filtering, merge intent |

use crate::types::BoxError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Group a deferred prop lands in when none is given.
pub const DEFAULT_DEFER_GROUP: &str = "default";

// =============================================================================
// RESOLVER
// =============================================================================

/// A zero-argument callback producing a prop.
///
/// The result is itself a `Prop`, so a callback may return another variant and
/// the evaluator keeps unwrapping.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn() -> Result<Prop, BoxError> + Send + Sync>);

impl Resolver {
    /// Wrap a callback.
    pub fn new<F, T>(f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        T: Into<Prop>,
    {
        Self(Arc::new(move || f().map(Into::into)))
    }

    /// Invoke the callback once.
    pub fn call(&self) -> Result<Prop, BoxError> {
        (self.0)()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// A prop that can ask the client to merge instead of replace.
pub trait Mergeable {
    /// Whether the client should merge this prop at all.
    fn should_merge(&self) -> bool;

    /// Whether the merge is deep (recursive) rather than shallow.
    fn should_deep_merge(&self) -> bool;

    /// Fields used to match array items during the merge.
    fn matches_on(&self) -> &[String];
}

// =============================================================================
// PROP
// =============================================================================

/// A single response property, before evaluation.
#[derive(Debug, Clone)]
pub enum Prop {
    /// A concrete JSON value.
    Value(Value),
    /// Computed on every render, including first loads.
    Provider(Resolver),
    /// Computed only when explicitly requested by a partial reload.
    Lazy(Resolver),
    /// Computed only when explicitly requested by a partial reload.
    Optional(Resolver),
    /// Never sent on first load; the client fetches it afterwards by group.
    Deferred(DeferredProp),
    /// Sent on every response regardless of partial-reload filtering.
    Always(Box<Prop>),
    /// Advertises shallow or deep merge intent for the wrapped prop.
    Merge(MergeProp),
}

impl Prop {
    /// A plain value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// A value computed on every render.
    pub fn provider<F, T>(f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        T: Into<Prop>,
    {
        Self::Provider(Resolver::new(f))
    }

    /// A value computed only when a partial reload asks for it.
    pub fn lazy<F, T>(f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        T: Into<Prop>,
    {
        Self::Lazy(Resolver::new(f))
    }

    /// Same first-load behaviour as [`Prop::lazy`].
    pub fn optional<F, T>(f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        T: Into<Prop>,
    {
        Self::Optional(Resolver::new(f))
    }

    /// A deferred prop in the `"default"` group.
    pub fn defer<F, T>(f: F) -> DeferredProp
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        T: Into<Prop>,
    {
        DeferredProp::new(Resolver::new(f))
    }

    /// A prop that bypasses every partial-reload filter.
    pub fn always(inner: impl Into<Prop>) -> Self {
        Self::Always(Box::new(inner.into()))
    }

    /// A prop the client shallow-merges into its current value.
    pub fn merge(inner: impl Into<Prop>) -> MergeProp {
        MergeProp::new(inner.into(), false)
    }

    /// A prop the client deep-merges into its current value.
    pub fn deep_merge(inner: impl Into<Prop>) -> MergeProp {
        MergeProp::new(inner.into(), true)
    }

    /// True for variants that must not be computed on a first load.
    ///
    /// Only the outermost variant counts: `Always(Lazy(..))` is sent.
    pub fn ignores_first_load(&self) -> bool {
        matches!(self, Self::Lazy(_) | Self::Optional(_) | Self::Deferred(_))
    }

    /// True for `Always` props.
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always(_))
    }

    /// Merge capability, looking through an `Always` wrapper.
    pub fn mergeable(&self) -> Option<&dyn Mergeable> {
        match self {
            Self::Merge(m) => Some(m),
            Self::Deferred(d) => Some(d),
            Self::Always(inner) => inner.mergeable(),
            Self::Value(_) | Self::Provider(_) | Self::Lazy(_) | Self::Optional(_) => None,
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// DEFERRED
// =============================================================================

/// A prop left out of the first response and fetched later by group.
#[derive(Debug, Clone)]
pub struct DeferredProp {
    resolver: Resolver,
    group: String,
    merge: bool,
    deep_merge: bool,
    matches_on: Vec<String>,
}

impl DeferredProp {
    /// Defer a resolver into the default group.
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            group: DEFAULT_DEFER_GROUP.to_string(),
            merge: false,
            deep_merge: false,
            matches_on: Vec::new(),
        }
    }

    /// Put this prop into a named group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Ask the client to shallow-merge the loaded value.
    #[must_use]
    pub fn merge(mut self) -> Self {
        self.merge = true;
        self
    }

    /// Ask the client to deep-merge the loaded value.
    #[must_use]
    pub fn deep_merge(mut self) -> Self {
        self.merge = true;
        self.deep_merge = true;
        self
    }

    /// Match array items on these fields when merging.
    #[must_use]
    pub fn match_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matches_on.extend(fields.into_iter().map(Into::into));
        self
    }

    /// The group this prop is announced under.
    pub fn group_name(&self) -> &str {
        &self.group
    }

    /// The callback producing the value.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl Mergeable for DeferredProp {
    fn should_merge(&self) -> bool {
        self.merge
    }

    fn should_deep_merge(&self) -> bool {
        self.deep_merge
    }

    fn matches_on(&self) -> &[String] {
        &self.matches_on
    }
}

impl From<DeferredProp> for Prop {
    fn from(prop: DeferredProp) -> Self {
        Self::Deferred(prop)
    }
}

// =============================================================================
// MERGE
// =============================================================================

/// A prop wrapper carrying merge intent.
#[derive(Debug, Clone)]
pub struct MergeProp {
    inner: Box<Prop>,
    deep: bool,
    matches_on: Vec<String>,
}

impl MergeProp {
    fn new(inner: Prop, deep: bool) -> Self {
        Self {
            inner: Box::new(inner),
            deep,
            matches_on: Vec::new(),
        }
    }

    /// Switch to a deep merge.
    #[must_use]
    pub fn deep(mut self) -> Self {
        self.deep = true;
        self
    }

    /// Match array items on these fields when merging.
    #[must_use]
    pub fn match_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matches_on.extend(fields.into_iter().map(Into::into));
        self
    }

    /// The wrapped prop.
    pub fn inner(&self) -> &Prop {
        &self.inner
    }

    /// Unwrap into the wrapped prop.
    pub fn into_inner(self) -> Prop {
        *self.inner
    }
}

impl Mergeable for MergeProp {
    fn should_merge(&self) -> bool {
        true
    }

    fn should_deep_merge(&self) -> bool {
        self.deep
    }

    fn matches_on(&self) -> &[String] {
        &self.matches_on
    }
}

impl From<MergeProp> for Prop {
    fn from(prop: MergeProp) -> Self {
        Self::Merge(prop)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_load_capability() {
        assert!(Prop::lazy(|| Ok(json!(1))).ignores_first_load());
        assert!(Prop::optional(|| Ok(json!(1))).ignores_first_load());
        assert!(Prop::from(Prop::defer(|| Ok(json!(1)))).ignores_first_load());

        assert!(!Prop::value(1).ignores_first_load());
        assert!(!Prop::provider(|| Ok(json!(1))).ignores_first_load());
        assert!(!Prop::always(Prop::lazy(|| Ok(json!(1)))).ignores_first_load());
        assert!(!Prop::from(Prop::merge(json!([1]))).ignores_first_load());
    }

    #[test]
    fn defer_defaults_to_default_group() {
        let prop = Prop::defer(|| Ok(json!(1)));
        assert_eq!(prop.group_name(), "default");
        assert!(!prop.should_merge());
        assert!(!prop.should_deep_merge());

        let grouped = Prop::defer(|| Ok(json!(1))).group("sidebar");
        assert_eq!(grouped.group_name(), "sidebar");
    }

    #[test]
    fn defer_deep_merge_implies_merge() {
        let prop = Prop::defer(|| Ok(json!(1))).deep_merge();
        assert!(prop.should_merge());
        assert!(prop.should_deep_merge());
    }

    #[test]
    fn merge_is_always_mergeable() {
        let shallow = Prop::merge(json!([1]));
        assert!(shallow.should_merge());
        assert!(!shallow.should_deep_merge());

        let deep = Prop::deep_merge(json!({"a": 1}));
        assert!(deep.should_deep_merge());

        let upgraded = Prop::merge(json!([1])).deep();
        assert!(upgraded.should_deep_merge());
    }

    #[test]
    fn match_on_accumulates() {
        let prop = Prop::merge(json!([])).match_on(["id"]).match_on(["slug", "locale"]);
        assert_eq!(prop.matches_on(), ["id", "slug", "locale"]);
    }

    #[test]
    fn mergeable_looks_through_always() {
        let prop = Prop::always(Prop::merge(json!("v")));
        let cap = prop.mergeable().expect("mergeable");
        assert!(cap.should_merge());

        assert!(Prop::value("plain").mergeable().is_none());
        assert!(Prop::lazy(|| Ok(json!(1))).mergeable().is_none());
    }

    #[test]
    fn resolver_invokes_callback_each_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolver = Resolver::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!("x"))
        });

        resolver.call().expect("first");
        resolver.call().expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
