//! # Prop Evaluator
//!
//! Reduces every variant to a concrete JSON value.
//!
//! Callbacks may return further variants (a lazy prop can produce an `Always`
//! wrapping a `Merge`, and so on); evaluation keeps unwrapping until a plain
//! value comes out. The first failing callback aborts the whole set: one broken
//! computed prop invalidates the response, so the remaining keys are never run.

use crate::prop::Prop;
use crate::types::{BoxError, InertiaError, Props};
use serde_json::{Map, Value};

/// Evaluate a whole property set, stopping at the first failure.
pub fn evaluate_props(props: Props) -> Result<Map<String, Value>, InertiaError> {
    let mut evaluated = Map::with_capacity(props.len());
    for (key, prop) in props {
        match evaluate_prop(prop) {
            Ok(value) => {
                evaluated.insert(key, value);
            }
            Err(source) => return Err(InertiaError::evaluation(key, source)),
        }
    }
    Ok(evaluated)
}

/// Evaluate a single prop down to a value.
///
/// Each callback met along the way is invoked exactly once.
pub fn evaluate_prop(prop: Prop) -> Result<Value, BoxError> {
    let mut current = prop;
    loop {
        current = match current {
            Prop::Value(value) => return Ok(value),
            Prop::Provider(resolver) | Prop::Lazy(resolver) | Prop::Optional(resolver) => {
                resolver.call()?
            }
            Prop::Deferred(deferred) => deferred.resolver().call()?,
            Prop::Always(inner) => *inner,
            Prop::Merge(merge) => merge.into_inner(),
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
