//! # Page Object
//!
//! The wire payload handed to the client, either as a JSON body or embedded in
//! the first HTML document. Created fresh for every response and never touched
//! after it leaves the assembler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The final, evaluated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Client-side component name.
    pub component: String,
    /// Evaluated props.
    pub props: Map<String, Value>,
    /// Request URL (path and query).
    pub url: String,
    /// Current asset version.
    pub version: String,
    /// Whether the client should encrypt this history entry.
    pub encrypt_history: bool,
    /// Whether the client should purge its history.
    pub clear_history: bool,
    /// Deferred groups the client should fetch next.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deferred_props: BTreeMap<String, Vec<String>>,
    /// Keys to shallow-merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_props: Vec<String>,
    /// Keys to deep-merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deep_merge_props: Vec<String>,
    /// `"key.field"` match pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_props_on: Vec<String>,
}

impl Page {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, crate::InertiaError> {
        serde_json::to_string(self).map_err(|e| crate::InertiaError::Serialization(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare() -> Page {
        Page {
            component: "Home".to_string(),
            props: Map::new(),
            url: "/".to_string(),
            version: "1".to_string(),
            encrypt_history: false,
            clear_history: false,
            deferred_props: BTreeMap::new(),
            merge_props: Vec::new(),
            deep_merge_props: Vec::new(),
            match_props_on: Vec::new(),
        }
    }

    #[test]
    fn empty_metadata_is_omitted() {
        let json = bare().to_json().expect("serialize");
        assert_eq!(
            json,
            r#"{"component":"Home","props":{},"url":"/","version":"1","encryptHistory":false,"clearHistory":false}"#
        );
    }

    #[test]
    fn metadata_uses_camel_case() {
        let mut page = bare();
        page.deferred_props.insert("default".to_string(), vec!["stats".to_string()]);
        page.merge_props.push("posts".to_string());
        page.deep_merge_props.push("tree".to_string());
        page.match_props_on.push("posts.id".to_string());

        let value = serde_json::to_value(&page).expect("serialize");
        assert_eq!(value["deferredProps"], json!({"default": ["stats"]}));
        assert_eq!(value["mergeProps"], json!(["posts"]));
        assert_eq!(value["deepMergeProps"], json!(["tree"]));
        assert_eq!(value["matchPropsOn"], json!(["posts.id"]));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let page: Page = serde_json::from_str(
            r#"{"component":"A","props":{"x":1},"url":"/a","version":"v","encryptHistory":true,"clearHistory":false}"#,
        )
        .expect("deserialize");
        assert_eq!(page.component, "A");
        assert!(page.encrypt_history);
        assert!(page.deferred_props.is_empty());
    }
}
