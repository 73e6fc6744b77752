//! # Asset Version Sources
//!
//! The asset version is an opaque string identifying the current front-end
//! build. A client that sends a different one is told to do a full reload.

use crate::types::InertiaError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the current asset version comes from.
#[derive(Clone)]
pub enum VersionSource {
    /// A version fixed at startup.
    Fixed(String),
    /// A version computed on every request.
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl VersionSource {
    /// A fixed version.
    pub fn fixed(version: impl Into<String>) -> Self {
        Self::Fixed(version.into())
    }

    /// A version computed by `f` whenever it is needed.
    pub fn dynamic(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    /// Fingerprint a build manifest with BLAKE3.
    ///
    /// Any change in the manifest (new chunk hashes after a rebuild) yields a
    /// new version.
    pub fn from_manifest(path: &Path) -> Result<Self, InertiaError> {
        let bytes = std::fs::read(path).map_err(|e| {
            InertiaError::Io(format!("cannot read manifest '{}': {}", path.display(), e))
        })?;
        Ok(Self::Fixed(manifest_fingerprint(&bytes)))
    }

    /// Resolve the current version.
    pub fn current(&self) -> String {
        match self {
            Self::Fixed(v) => v.clone(),
            Self::Dynamic(f) => f(),
        }
    }
}

impl Default for VersionSource {
    /// `GAE_VERSION` when deployed on App Engine, otherwise the startup time in
    /// seconds, so every restart during development invalidates old clients.
    fn default() -> Self {
        match std::env::var("GAE_VERSION") {
            Ok(v) if !v.is_empty() => Self::Fixed(v),
            _ => Self::Fixed(startup_stamp()),
        }
    }
}

impl fmt::Debug for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Short hex fingerprint of manifest contents.
pub fn manifest_fingerprint(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    hash.to_hex().as_str()[..16].to_string()
}

fn startup_stamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn fixed_version() {
        assert_eq!(VersionSource::fixed("1.0.0").current(), "1.0.0");
    }

    #[test]
    fn dynamic_version_is_recomputed() {
        let counter = Arc::new(AtomicU32::new(0));
        let source = {
            let counter = Arc::clone(&counter);
            VersionSource::dynamic(move || counter.fetch_add(1, Ordering::SeqCst).to_string())
        };
        assert_eq!(source.current(), "0");
        assert_eq!(source.current(), "1");
    }

    #[test]
    fn manifest_fingerprint_tracks_content() {
        let a = manifest_fingerprint(br#"{"app.js":{"file":"app-1.js"}}"#);
        let b = manifest_fingerprint(br#"{"app.js":{"file":"app-2.js"}}"#);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert_eq!(a, manifest_fingerprint(br#"{"app.js":{"file":"app-1.js"}}"#));
    }

    #[test]
    fn from_manifest_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"{}").expect("write");

        let source = VersionSource::from_manifest(file.path()).expect("manifest");
        assert_eq!(source.current(), manifest_fingerprint(b"{}"));
    }

    #[test]
    fn from_manifest_missing_file() {
        let err = VersionSource::from_manifest(Path::new("/definitely/not/here.json"))
            .expect_err("missing");
        assert!(matches!(err, InertiaError::Io(_)));
    }
}
