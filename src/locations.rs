//! Schema location resolution
//!
//! A `schemaLocation` value is either a URL or a file path. Remote URLs are
//! never fetched; local paths are looked up on disk relative to the
//! referencing document and then under the configured search roots.

use std::path::{Path, PathBuf};

use url::Url;

/// Schemes treated as network locations
const NETWORK_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Resource location - a URL or a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// Non-file URL (http, https, ftp, urn, ...)
    Url(Url),
}

impl Location {
    /// Classify a raw `schemaLocation` string.
    ///
    /// `file:` URLs become paths. Single-letter schemes are Windows drive
    /// letters, not URLs.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return Location::Path(path);
                }
            } else if url.scheme().len() > 1 {
                return Location::Url(url);
            }
        }

        Location::Path(PathBuf::from(s))
    }

    /// Check if this is a non-file location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is an http, https or ftp location
    pub fn is_network(&self) -> bool {
        match self {
            Location::Url(url) => NETWORK_SCHEMES.contains(&url.scheme()),
            Location::Path(_) => false,
        }
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

/// Resolves `schemaLocation` values to canonical file paths
#[derive(Debug, Clone, Default)]
pub struct SchemaLocationResolver {
    /// Extra directories searched after the referencing file's directory
    search_roots: Vec<PathBuf>,
}

impl SchemaLocationResolver {
    /// Create a resolver with extra search roots
    pub fn new(search_roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_roots: search_roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured search roots
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// Candidate paths for a location, in search order
    ///
    /// 1. The path itself if it is absolute
    /// 2. Relative to the referencing file's directory
    /// 3. Relative to each search root
    pub fn candidates(&self, schema_location: &str, referencing_file: &Path) -> Vec<PathBuf> {
        let path = match Location::parse(schema_location) {
            Location::Path(path) => path,
            Location::Url(_) => return Vec::new(),
        };

        if path.is_absolute() {
            return vec![path];
        }

        let mut candidates = Vec::with_capacity(self.search_roots.len() + 1);
        let base = referencing_file.parent().unwrap_or_else(|| Path::new("."));
        candidates.push(base.join(&path));
        candidates.extend(self.search_roots.iter().map(|root| root.join(&path)));
        candidates
    }

    /// Resolve a location to an existing canonical file, or `None`
    pub fn resolve(&self, schema_location: &str, referencing_file: &Path) -> Option<PathBuf> {
        for candidate in self.candidates(schema_location, referencing_file) {
            if candidate.is_file() {
                if let Ok(canonical) = candidate.canonicalize() {
                    log::debug!("resolved '{}' to {}", schema_location, canonical.display());
                    return Some(canonical);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_location_from_url() {
        let loc = Location::parse("http://example.com/schema.xsd");
        assert!(loc.is_remote());
        assert!(loc.is_network());

        let urn = Location::parse("urn:oasis:names:tc:dita:xsd:topic.xsd");
        assert!(urn.is_remote());
        assert!(!urn.is_network());
    }

    #[test]
    fn test_location_from_path() {
        assert!(Location::parse("/tmp/schema.xsd").is_file());
        assert!(Location::parse("types/common.xsd").is_file());
        assert!(Location::parse("../common.xsd").is_file());
    }

    #[test]
    fn test_file_url_becomes_path() {
        let loc = Location::parse("file:///tmp/schema.xsd");
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/schema.xsd")));
    }

    #[test]
    fn test_resolve_relative_to_referencing_file() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/types.xsd"), "<x/>").unwrap();

        let resolver = SchemaLocationResolver::default();
        let resolved = resolver
            .resolve("sub/types.xsd", &dir.path().join("main.xsd"))
            .unwrap();

        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("sub/types.xsd"));
    }

    #[test]
    fn test_resolve_through_search_roots() {
        let dir = tempdir().unwrap();
        let shared = dir.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("common.xsd"), "<x/>").unwrap();

        let referencing = dir.path().join("schemas/main.xsd");
        assert!(SchemaLocationResolver::default()
            .resolve("common.xsd", &referencing)
            .is_none());

        let resolver = SchemaLocationResolver::new([&shared]);
        assert!(resolver.resolve("common.xsd", &referencing).is_some());
    }

    #[test]
    fn test_missing_and_remote_locations_are_none() {
        let dir = tempdir().unwrap();
        let resolver = SchemaLocationResolver::new([dir.path()]);
        let referencing = dir.path().join("main.xsd");

        assert!(resolver.resolve("missing.xsd", &referencing).is_none());
        assert!(resolver
            .resolve("https://example.com/remote.xsd", &referencing)
            .is_none());
    }
}
