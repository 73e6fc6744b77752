//! # HTML Rendering
//!
//! The first visit to a page gets an HTML document instead of JSON. A
//! `Renderer` turns the page (plus optional SSR fragments and view data) into
//! that document.
//!
//! `ShellRenderer` is a deliberately small implementation: named root views
//! with three kinds of placeholders, no template language.
//!
//! | Placeholder    | Replaced with                                            |
//! |----------------|----------------------------------------------------------|
//! | `@inertiaHead` | SSR head fragments, or nothing                           |
//! | `@inertia`     | SSR body, or `<div id="app" data-page="…"></div>`        |
//! | `@{key}`       | HTML-escaped view-data value (`""` when missing)         |

use super::ssr::SsrResponse;
use inertia_core::{InertiaError, Page};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Root view used when none is configured.
pub const DEFAULT_ROOT_VIEW: &str = "app.html";

/// Default id of the element the client mounts into.
pub const DEFAULT_CONTAINER_ID: &str = "app";

// =============================================================================
// RENDERER TRAIT
// =============================================================================

/// Everything a renderer gets for one HTML response.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The assembled page.
    pub page: &'a Page,
    /// Name of the root view to render.
    pub view: &'a str,
    /// Caller-supplied extra data for the view.
    pub view_data: &'a Map<String, Value>,
    /// Pre-rendered fragments when SSR ran for this response.
    pub ssr: Option<&'a SsrResponse>,
}

/// Produces the HTML document for a first visit.
pub trait Renderer: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, InertiaError>;
}

// =============================================================================
// SHELL RENDERER
// =============================================================================

/// Renders named HTML shells with `@inertiaHead` / `@inertia` placeholders.
#[derive(Debug, Clone)]
pub struct ShellRenderer {
    templates: BTreeMap<String, String>,
    container_id: String,
}

impl Default for ShellRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellRenderer {
    /// A renderer with no views.
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }

    /// Register a view from source.
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(name.into(), source.into());
        self
    }

    /// Register a view from a file; the view is named after the file name.
    pub fn with_template_file(self, path: &Path) -> Result<Self, InertiaError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| InertiaError::Template(format!("'{}' has no file name", path.display())))?;
        let source = std::fs::read_to_string(path).map_err(|e| {
            InertiaError::Io(format!("cannot read root view '{}': {}", path.display(), e))
        })?;
        Ok(self.with_template(name, source))
    }

    /// Id of the mount element.
    #[must_use]
    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Client-side-render placeholder carrying the page as `data-page`.
    pub fn page_container(&self, page: &Page) -> Result<String, InertiaError> {
        let json = page.to_json()?;
        Ok(format!(
            r#"<div id="{}" data-page="{}"></div>"#,
            escape_html(&self.container_id),
            escape_html(&json)
        ))
    }
}

impl Renderer for ShellRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, InertiaError> {
        let template = self
            .templates
            .get(ctx.view)
            .ok_or_else(|| InertiaError::Template(format!("root view '{}' not registered", ctx.view)))?;

        let (head, body) = match ctx.ssr {
            Some(ssr) => (ssr.head_html(), ssr.body.clone()),
            None => (String::new(), self.page_container(ctx.page)?),
        };

        Ok(fill_placeholders(template, &head, &body, ctx.view_data))
    }
}

/// Single pass over the template so inserted fragments are never rescanned.
fn fill_placeholders(template: &str, head: &str, body: &str, view_data: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len() + head.len() + body.len());
    let mut rest = template;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];

        if let Some(after) = tail.strip_prefix("@inertiaHead") {
            out.push_str(head);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("@inertia") {
            out.push_str(body);
            rest = after;
        } else if let Some((key, after)) = tail.strip_prefix("@{").and_then(placeholder_key) {
            if let Some(value) = view_data.get(key) {
                out.push_str(&escape_html(&view_value(value)));
            }
            rest = after;
        } else {
            out.push('@');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Longest view-data key a placeholder may name.
const MAX_PLACEHOLDER_KEY: usize = 64;

/// Split `key}rest` when `key` is a plain identifier; anything else is
/// template text.
fn placeholder_key(text: &str) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .take(MAX_PLACEHOLDER_KEY + 1)
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        .map(|(i, _)| i)?;
    let (key, rest) = text.split_at(end);
    let after = rest.strip_prefix('}')?;
    (!key.is_empty()).then_some((key, after))
}

fn view_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Escape text for an HTML attribute or element body.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHELL: &str =
        "<html><head>@inertiaHead<title>@{title}</title></head><body>@inertia</body></html>";

    fn page() -> Page {
        let mut props = Map::new();
        props.insert("msg".to_string(), json!("<b>\"hi\" & 'bye'</b>"));
        Page {
            component: "Home".to_string(),
            props,
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
    fn client_render_embeds_escaped_page() {
        let renderer = ShellRenderer::new().with_template("app.html", SHELL);
        let page = page();
        let mut view_data = Map::new();
        view_data.insert("title".to_string(), json!("A & B"));

        let html = renderer
            .render(&RenderContext {
                page: &page,
                view: "app.html",
                view_data: &view_data,
                ssr: None,
            })
            .expect("render");

        assert!(html.starts_with("<html><head><title>A &amp; B</title>"));
        assert!(html.contains(r#"<div id="app" data-page="{&#34;component&#34;:&#34;Home&#34;"#));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn ssr_fragments_replace_placeholders() {
        let renderer = ShellRenderer::new().with_template("app.html", SHELL);
        let page = page();
        let ssr = SsrResponse {
            head: vec!["<title inertia>Home</title>".to_string(), "<meta name=\"x\">".to_string()],
            body: "<div id=\"app\">@inertia stays</div>".to_string(),
        };

        let html = renderer
            .render(&RenderContext {
                page: &page,
                view: "app.html",
                view_data: &Map::new(),
                ssr: Some(&ssr),
            })
            .expect("render");

        assert!(html.contains("<title inertia>Home</title>\n<meta name=\"x\">"));
        assert!(html.contains("<div id=\"app\">@inertia stays</div>"));
        assert!(!html.contains("data-page"));
    }

    #[test]
    fn unknown_view_is_template_error() {
        let renderer = ShellRenderer::new();
        let page = page();
        let err = renderer
            .render(&RenderContext {
                page: &page,
                view: "missing.html",
                view_data: &Map::new(),
                ssr: None,
            })
            .expect_err("missing view");
        assert!(matches!(err, InertiaError::Template(_)));
    }

    #[test]
    fn custom_container_and_stray_at_signs() {
        let renderer = ShellRenderer::new()
            .container_id("root")
            .with_template("v", "mail@example.com @inertia @{unclosed");
        let page = page();
        let html = renderer
            .render(&RenderContext {
                page: &page,
                view: "v",
                view_data: &Map::new(),
                ssr: None,
            })
            .expect("render");

        assert!(html.starts_with("mail@example.com <div id=\"root\""));
        assert!(html.ends_with("@{unclosed"));
    }

    #[test]
    fn template_file_named_after_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shell.html");
        std::fs::write(&path, "<body>@inertia</body>").expect("write");

        let renderer = ShellRenderer::new().with_template_file(&path).expect("load");
        let page = page();
        let html = renderer
            .render(&RenderContext {
                page: &page,
                view: "shell.html",
                view_data: &Map::new(),
                ssr: None,
            })
            .expect("render");
        assert!(html.starts_with("<body><div id=\"app\""));
    }

    #[test]
    fn stray_placeholder_opener_leaves_script_intact() {
        let template = "@{oops <script>var a = {x: 1};</script> @{title}";
        let mut view_data = Map::new();
        view_data.insert("title".to_string(), json!("Home"));
        let html = fill_placeholders(template, "", "", &view_data);
        assert_eq!(html, "@{oops <script>var a = {x: 1};</script> Home");
    }

    #[test]
    fn placeholder_keys_are_identifiers() {
        let view_data = Map::new();
        assert_eq!(fill_placeholders("@{}", "", "", &view_data), "@{}");
        assert_eq!(fill_placeholders("@{ title }", "", "", &view_data), "@{ title }");
        assert_eq!(fill_placeholders("@{user.name}!", "", "", &view_data), "!");

        let long = format!("@{{{}}}", "k".repeat(MAX_PLACEHOLDER_KEY + 1));
        assert_eq!(fill_placeholders(&long, "", "", &view_data), long);
    }
}
