//! Path specifications: which elements a filter should capture.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::is_ncname;
use crate::error::{FragmentError, Result};
use crate::types::{ElementSpec, QName};

/// Where a path specification is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The spec describes the full path from the document root.
    Root,
    /// The spec must match the innermost elements of the current path.
    Relative,
}

/// An ordered, non-empty sequence of element specs.
///
/// Textual notation: segments separated by `/`, each written as `local`,
/// `{uri}local` or `prefix:local`. A leading `//` anchors the spec
/// relatively; a single leading `/` (or none) anchors it at the root.
///
/// # Examples
/// ```
/// use sax_fragments::path::PathSpec;
/// use sax_fragments::types::QName;
///
/// let spec: PathSpec = "/order/{urn:billing}total".parse().unwrap();
/// let path = [QName::local("order"), QName::new("urn:billing", "total")];
/// assert!(spec.matches(&path));
/// assert!(!spec.matches(&path[..1]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSpec {
    anchor: Anchor,
    segments: Vec<ElementSpec>,
}

impl PathSpec {
    /// A spec anchored at the document root.
    pub fn absolute(segments: impl IntoIterator<Item = ElementSpec>) -> Result<Self> {
        Self::build(Anchor::Root, segments.into_iter().collect())
    }

    /// A spec matching the innermost elements of any path.
    pub fn relative(segments: impl IntoIterator<Item = ElementSpec>) -> Result<Self> {
        Self::build(Anchor::Relative, segments.into_iter().collect())
    }

    /// A root-anchored spec of un-namespaced local names.
    pub fn from_locals<'a>(locals: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        Self::absolute(locals.into_iter().map(QName::local))
    }

    fn build(anchor: Anchor, segments: Vec<ElementSpec>) -> Result<Self> {
        let spec = Self { anchor, segments };
        if spec.segments.is_empty() {
            return Err(FragmentError::InvalidPathSpec {
                spec: spec.to_string(),
                reason: "a path needs at least one element".to_string(),
            });
        }
        if let Some(bad) = spec.segments.iter().find(|s| !is_ncname(s.local_name())) {
            return Err(FragmentError::InvalidPathSpec {
                spec: spec.to_string(),
                reason: format!("'{}' is not a valid element name", bad.local_name()),
            });
        }
        Ok(spec)
    }

    /// Parse the textual notation without any prefix bindings.
    pub fn parse(notation: &str) -> Result<Self> {
        Self::parse_with_namespaces(notation, &HashMap::new())
    }

    /// Parse the textual notation, resolving `prefix:local` segments through
    /// the given prefix-to-URI map.
    pub fn parse_with_namespaces(
        notation: &str,
        namespaces: &HashMap<String, String>,
    ) -> Result<Self> {
        let invalid = |reason: String| FragmentError::InvalidPathSpec {
            spec: notation.to_string(),
            reason,
        };

        let trimmed = notation.trim();
        let (anchor, body) = if let Some(rest) = trimmed.strip_prefix("//") {
            (Anchor::Relative, rest)
        } else {
            (Anchor::Root, trimmed.strip_prefix('/').unwrap_or(trimmed))
        };

        let mut segments = Vec::new();
        for raw in split_segments(body).map_err(&invalid)? {
            segments.push(parse_segment(raw, namespaces).map_err(&invalid)?);
        }

        Self::build(anchor, segments).map_err(|err| match err {
            FragmentError::InvalidPathSpec { reason, .. } => invalid(reason),
            other => other,
        })
    }

    #[must_use]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.anchor == Anchor::Relative
    }

    #[must_use]
    pub fn segments(&self) -> &[ElementSpec] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; construction rejects empty specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check a tracked path against this spec.
    ///
    /// Root-anchored specs require exact positional equality; relative
    /// specs require the path to end with the spec's segments.
    #[must_use]
    pub fn matches(&self, path: &[QName]) -> bool {
        match self.anchor {
            Anchor::Root => path == self.segments.as_slice(),
            Anchor::Relative => path.ends_with(&self.segments),
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.anchor == Anchor::Relative {
            f.write_str("/")?;
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathSpec {
    type Err = FragmentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split on `/`, ignoring separators inside `{...}` namespace URIs.
fn split_segments(body: &str) -> std::result::Result<Vec<&str>, String> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_uri = false;

    for (i, c) in body.char_indices() {
        match c {
            '{' if !in_uri => in_uri = true,
            '}' if in_uri => in_uri = false,
            '/' if !in_uri => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_uri {
        return Err("unterminated '{' in namespace URI".to_string());
    }
    segments.push(&body[start..]);

    if segments.iter().any(|s| s.is_empty()) {
        return Err("empty path segment".to_string());
    }
    Ok(segments)
}

fn parse_segment(
    raw: &str,
    namespaces: &HashMap<String, String>,
) -> std::result::Result<QName, String> {
    if let Some(rest) = raw.strip_prefix('{') {
        let (uri, local) = rest
            .split_once('}')
            .ok_or_else(|| format!("unterminated namespace in '{raw}'"))?;
        return Ok(QName::new(uri, local));
    }

    match raw.split_once(':') {
        Some((prefix, local)) => {
            if !is_ncname(prefix) {
                return Err(format!("'{prefix}' is not a valid prefix"));
            }
            let uri = namespaces
                .get(prefix)
                .ok_or_else(|| format!("prefix '{prefix}' is not bound"))?;
            Ok(QName::new(uri.as_str(), local))
        }
        None => Ok(QName::local(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(locals: &[&str]) -> Vec<QName> {
        locals.iter().map(|l| QName::local(*l)).collect()
    }

    #[test]
    fn test_parse_absolute() {
        let spec = PathSpec::parse("/a/b").unwrap();
        assert_eq!(spec.anchor(), Anchor::Root);
        assert_eq!(spec.segments(), path(&["a", "b"]).as_slice());

        let without_slash = PathSpec::parse("a/b").unwrap();
        assert_eq!(spec, without_slash);
    }

    #[test]
    fn test_parse_relative() {
        let spec = PathSpec::parse("//b/c").unwrap();
        assert!(spec.is_relative());
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_parse_clark_notation_with_slashes_in_uri() {
        let spec = PathSpec::parse("/{http://example.org/ns}a/b").unwrap();
        assert_eq!(
            spec.segments(),
            &[QName::new("http://example.org/ns", "a"), QName::local("b")]
        );
    }

    #[test]
    fn test_parse_prefixed() {
        let mut ns = HashMap::new();
        ns.insert("inv".to_string(), "urn:invoice".to_string());

        let spec = PathSpec::parse_with_namespaces("inv:invoice/inv:date", &ns).unwrap();
        assert_eq!(
            spec.segments(),
            &[
                QName::new("urn:invoice", "invoice"),
                QName::new("urn:invoice", "date")
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(PathSpec::parse("").is_err());
        assert!(PathSpec::parse("/").is_err());
        assert!(PathSpec::parse("a//b").is_err());
        assert!(PathSpec::parse("a/").is_err());
        assert!(PathSpec::parse("{urn:x").is_err());
        assert!(PathSpec::parse("1a").is_err());
        assert!(PathSpec::parse("p:a").is_err());
    }

    #[test]
    fn test_parse_error_mentions_notation() {
        let err = PathSpec::parse("x:a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid path specification 'x:a': prefix 'x' is not bound"
        );
    }

    #[test]
    fn test_absolute_match_is_exact() {
        let spec = PathSpec::from_locals(["a", "b"]).unwrap();
        assert!(spec.matches(&path(&["a", "b"])));
        assert!(!spec.matches(&path(&["a"])));
        assert!(!spec.matches(&path(&["a", "b", "c"])));
        assert!(!spec.matches(&path(&["x", "a", "b"])));
    }

    #[test]
    fn test_relative_match_is_suffix() {
        let spec = PathSpec::parse("//b/c").unwrap();
        assert!(spec.matches(&path(&["b", "c"])));
        assert!(spec.matches(&path(&["a", "b", "c"])));
        assert!(!spec.matches(&path(&["a", "b"])));
        assert!(!spec.matches(&path(&["c"])));
    }

    #[test]
    fn test_namespace_must_match() {
        let spec = PathSpec::parse("/{urn:x}a").unwrap();
        assert!(spec.matches(&[QName::new("urn:x", "a")]));
        assert!(!spec.matches(&[QName::local("a")]));
    }

    #[test]
    fn test_display_round_trips_notation() {
        for notation in ["/a/b", "//b", "/{urn:x}a/c"] {
            assert_eq!(PathSpec::parse(notation).unwrap().to_string(), notation);
        }
    }

    #[test]
    fn test_constructors_reject_empty() {
        assert!(PathSpec::absolute(Vec::new()).is_err());
        assert!(PathSpec::relative(Vec::new()).is_err());
    }
}
