//! Resource manifest: the mapping from logical path to content fingerprint
//! produced at each build, plus the shell file list fetched eagerly.
//!
//! Fingerprints are opaque hash strings compared by exact string equality
//! only. The manifest drives cache reuse vs eviction during activation and
//! decides which GET requests the asset layer intercepts.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Build-produced resource manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Logical path -> content fingerprint.
    #[serde(default)]
    pub resources: BTreeMap<String, String>,

    /// Shell resources downloaded before the gateway starts serving.
    #[serde(default)]
    pub shell: Vec<String>,
}

impl ResourceManifest {
    /// Parse a manifest from JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Manifest(format!("invalid manifest JSON: {e}")))
    }

    /// Load a manifest from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| Error::Manifest(format!("failed to read {}: {e}", path.as_ref().display())))?;
        Self::parse(&bytes)
    }

    /// Fingerprint for a logical path, if the manifest knows it.
    pub fn fingerprint(&self, key: &str) -> Option<&str> {
        self.resources.get(key).map(String::as_str)
    }

    /// Whether the manifest covers a logical path.
    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    /// Whether a cached entry under `key` is stale relative to this (new)
    /// manifest, given the previously persisted one.
    ///
    /// Stale when the path is absent from the new manifest, or when the
    /// fingerprints differ (including a path the old manifest never listed).
    pub fn is_stale(&self, old: &ResourceManifest, key: &str) -> bool {
        match self.fingerprint(key) {
            None => true,
            Some(new_fp) => old.fingerprint(key) != Some(new_fp),
        }
    }
}

/// Normalize a request path (with optional query) to a manifest key.
///
/// Strips the leading slash and any `?v=` cache-busting suffix; the empty
/// path and fragment-style paths map to the root document key `"/"`.
pub fn request_key(path_and_query: &str) -> String {
    let mut key = path_and_query.strip_prefix('/').unwrap_or(path_and_query);
    if let Some((base, _)) = key.split_once("?v=") {
        key = base;
    }
    if key.is_empty() || key.starts_with('#') {
        return "/".to_string();
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &str)]) -> ResourceManifest {
        ResourceManifest {
            resources: entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            shell: Vec::new(),
        }
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "resources": {"index.html": "abc123", "/": "abc123", "main.js": "def456"},
            "shell": ["main.js", "index.html"]
        }"#;
        let m = ResourceManifest::parse(json.as_bytes()).unwrap();
        assert_eq!(m.fingerprint("index.html"), Some("abc123"));
        assert_eq!(m.shell.len(), 2);
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let result = ResourceManifest::parse(b"not json");
        assert!(matches!(result, Err(Error::Manifest(_))));
    }

    #[test]
    fn test_stale_when_absent_from_new() {
        let old = manifest(&[("gone.js", "aaa")]);
        let new = manifest(&[]);
        assert!(new.is_stale(&old, "gone.js"));
    }

    #[test]
    fn test_stale_when_fingerprint_changed() {
        let old = manifest(&[("main.js", "aaa")]);
        let new = manifest(&[("main.js", "bbb")]);
        assert!(new.is_stale(&old, "main.js"));
    }

    #[test]
    fn test_fresh_when_fingerprints_equal() {
        let old = manifest(&[("main.js", "aaa")]);
        let new = manifest(&[("main.js", "aaa")]);
        assert!(!new.is_stale(&old, "main.js"));
    }

    #[test]
    fn test_stale_when_old_never_listed() {
        // A cached entry the old manifest never covered cannot be trusted.
        let old = manifest(&[]);
        let new = manifest(&[("main.js", "aaa")]);
        assert!(new.is_stale(&old, "main.js"));
    }

    #[test]
    fn test_request_key_root_forms() {
        assert_eq!(request_key("/"), "/");
        assert_eq!(request_key(""), "/");
        assert_eq!(request_key("/#home"), "/");
    }

    #[test]
    fn test_request_key_strips_version_query() {
        assert_eq!(request_key("/main.js?v=12345"), "main.js");
        assert_eq!(request_key("/main.js"), "main.js");
    }
}
