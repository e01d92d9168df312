//! Path-addressed fragment filter.
//!
//! The filter sits between the event source and the fragment handlers. It
//! tracks the element path, decides on every start-element whether a
//! registered path matches, and relays the matched subtree (and only that
//! subtree) to the registered handler.

use std::fmt;

use crate::error::{FragmentError, Result};
use crate::path::{PathSpec, PathTracker};
use crate::types::{QName, StartElement};
use crate::xml::ContentHandler;

/// What to do when several registered paths match the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// The first registered matching path wins.
    #[default]
    FirstMatch,
    /// Every matching path's handler receives the subtree.
    AllMatches,
    /// Several matches abort the parse with `AmbiguousMatch`.
    RejectAmbiguous,
}

impl MatchPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first",
            Self::AllMatches => "all",
            Self::RejectAmbiguous => "reject",
        }
    }
}

struct Registration<'h> {
    spec: PathSpec,
    handler: Box<dyn ContentHandler + 'h>,
    fragments: usize,
}

/// The subtree currently being relayed.
#[derive(Debug)]
struct Capture {
    /// Tracker depth of the fragment root.
    depth: usize,
    /// Indices into the registration list.
    targets: Vec<usize>,
}

/// Filter that routes path-matched subtrees to registered handlers.
///
/// Handlers are any [`ContentHandler`], owned or borrowed mutably; a
/// borrowed [`ContentToFragmentAdapter`](super::ContentToFragmentAdapter)
/// keeps its collected values available once the filter is dropped.
///
/// While a subtree is being captured, nested elements are not matched
/// again: each subtree belongs to the handler(s) chosen at its root.
/// Events outside any matched subtree are dropped.
pub struct PathFragmentFilter<'h> {
    tracker: PathTracker,
    registrations: Vec<Registration<'h>>,
    policy: MatchPolicy,
    capture: Option<Capture>,
    fragments: usize,
}

impl<'h> PathFragmentFilter<'h> {
    /// Create a filter with the default [`MatchPolicy::FirstMatch`] policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(MatchPolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self {
            tracker: PathTracker::new(),
            registrations: Vec::new(),
            policy,
            capture: None,
            fragments: 0,
        }
    }

    /// Register a handler for a path. Registration order decides the
    /// winner under [`MatchPolicy::FirstMatch`].
    pub fn register(&mut self, spec: PathSpec, handler: impl ContentHandler + 'h) {
        self.registrations.push(Registration {
            spec,
            handler: Box::new(handler),
            fragments: 0,
        });
    }

    /// Builder form of [`PathFragmentFilter::register`].
    #[must_use]
    pub fn with_handler(mut self, spec: PathSpec, handler: impl ContentHandler + 'h) -> Self {
        self.register(spec, handler);
        self
    }

    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Whether a matched subtree is currently being relayed.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// The element path at the current parse position.
    #[must_use]
    pub fn path(&self) -> &[QName] {
        self.tracker.path()
    }

    /// Total number of completed fragments.
    #[must_use]
    pub fn fragments_matched(&self) -> usize {
        self.fragments
    }

    /// Completed fragments per registered path, in registration order.
    #[must_use]
    pub fn match_counts(&self) -> Vec<(&PathSpec, usize)> {
        self.registrations
            .iter()
            .map(|r| (&r.spec, r.fragments))
            .collect()
    }

    /// Pick the handlers for a freshly opened element, honouring the policy.
    fn select_targets(&self) -> Result<Vec<usize>> {
        let path = self.tracker.path();
        let mut matched = self
            .registrations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.spec.matches(path))
            .map(|(i, _)| i);

        let targets: Vec<usize> = match self.policy {
            MatchPolicy::FirstMatch => matched.next().into_iter().collect(),
            MatchPolicy::AllMatches => matched.collect(),
            MatchPolicy::RejectAmbiguous => {
                let all: Vec<usize> = matched.collect();
                if all.len() > 1 {
                    return Err(FragmentError::AmbiguousMatch {
                        path: self.tracker.to_string(),
                        specs: all
                            .iter()
                            .map(|&i| self.registrations[i].spec.to_string())
                            .collect(),
                    });
                }
                all
            }
        };
        Ok(targets)
    }
}

impl Default for PathFragmentFilter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for PathFragmentFilter<'_> {
    fn start_document(&mut self) -> Result<()> {
        self.tracker.clear();
        self.capture = None;
        self.fragments = 0;
        for registration in &mut self.registrations {
            registration.fragments = 0;
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        tracing::debug!(
            fragments = self.fragments,
            registrations = self.registrations.len(),
            "Fragment filter finished"
        );
        Ok(())
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        self.tracker.push(element.name.clone());

        if let Some(capture) = &self.capture {
            for &i in &capture.targets {
                self.registrations[i].handler.start_element(element)?;
            }
            return Ok(());
        }

        let targets = self.select_targets()?;
        if targets.is_empty() {
            return Ok(());
        }

        tracing::trace!(
            path = %self.tracker,
            handlers = targets.len(),
            "Fragment capture started"
        );
        for &i in &targets {
            self.registrations[i].handler.start_element(element)?;
        }
        self.capture = Some(Capture {
            depth: self.tracker.depth(),
            targets,
        });
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        if let Some(capture) = &self.capture {
            for &i in &capture.targets {
                self.registrations[i].handler.end_element(name)?;
            }

            if self.tracker.depth() == capture.depth {
                tracing::trace!(path = %self.tracker, "Fragment capture finished");
                for &i in &capture.targets {
                    self.registrations[i].fragments += 1;
                }
                self.fragments += 1;
                self.capture = None;
            }
        }

        self.tracker.pop(name).map(|_| ())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if let Some(capture) = &self.capture {
            for &i in &capture.targets {
                self.registrations[i].handler.characters(text)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PathFragmentFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFragmentFilter")
            .field("policy", &self.policy)
            .field(
                "specs",
                &self
                    .registrations
                    .iter()
                    .map(|r| r.spec.to_string())
                    .collect::<Vec<_>>(),
            )
            .field("path", &self.tracker.to_string())
            .field("capture", &self.capture)
            .field("fragments", &self.fragments)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse_str, EventRecorder, RecordedEvent};
    use pretty_assertions::assert_eq;

    fn spec(notation: &str) -> PathSpec {
        PathSpec::parse(notation).unwrap()
    }

    fn start(local: &str) -> RecordedEvent {
        RecordedEvent::Start(StartElement::new(QName::local(local)))
    }

    fn end(local: &str) -> RecordedEvent {
        RecordedEvent::End(QName::local(local))
    }

    fn text(t: &str) -> RecordedEvent {
        RecordedEvent::Text(t.to_string())
    }

    #[test]
    fn test_relays_only_matched_subtree() {
        let mut recorder = EventRecorder::new();
        let mut filter = PathFragmentFilter::new().with_handler(spec("/a/b"), &mut recorder);
        parse_str("<a><x>skip</x><b><c>text</c></b><y/></a>", &mut filter).unwrap();
        assert_eq!(filter.fragments_matched(), 1);
        drop(filter);

        assert_eq!(
            recorder.events(),
            &[start("b"), start("c"), text("text"), end("c"), end("b")]
        );
    }

    #[test]
    fn test_capture_ends_at_fragment_root() {
        struct EndProbe<'a> {
            filter: PathFragmentFilter<'a>,
            capturing_after: Vec<(String, bool)>,
        }

        impl ContentHandler for EndProbe<'_> {
            fn start_element(&mut self, element: &StartElement) -> Result<()> {
                self.filter.start_element(element)
            }

            fn end_element(&mut self, name: &QName) -> Result<()> {
                self.filter.end_element(name)?;
                self.capturing_after
                    .push((name.local_name().to_string(), self.filter.is_capturing()));
                Ok(())
            }

            fn characters(&mut self, text: &str) -> Result<()> {
                self.filter.characters(text)
            }
        }

        let mut probe = EndProbe {
            filter: PathFragmentFilter::new().with_handler(spec("a/b"), EventRecorder::new()),
            capturing_after: Vec::new(),
        };
        parse_str("<a><b><c>text</c></b></a>", &mut probe).unwrap();

        assert_eq!(
            probe.capturing_after,
            vec![
                ("c".to_string(), true),
                ("b".to_string(), false),
                ("a".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_no_match_never_invokes_handler() {
        let mut recorder = EventRecorder::new();
        let mut filter = PathFragmentFilter::new().with_handler(spec("/a/missing"), &mut recorder);
        parse_str("<a><b>text</b></a>", &mut filter).unwrap();
        assert_eq!(filter.fragments_matched(), 0);
        drop(filter);

        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_repeated_matches() {
        let mut recorder = EventRecorder::new();
        let mut filter = PathFragmentFilter::new().with_handler(spec("/list/item"), &mut recorder);
        parse_str("<list><item>1</item><item>2</item></list>", &mut filter).unwrap();
        assert_eq!(filter.fragments_matched(), 2);
        drop(filter);

        assert_eq!(recorder.events().len(), 6);
    }

    #[test]
    fn test_counts_restart_for_each_document() {
        let mut recorder = EventRecorder::new();
        let mut filter = PathFragmentFilter::new().with_handler(spec("/a/b"), &mut recorder);
        parse_str("<a><b>one</b></a>", &mut filter).unwrap();
        parse_str("<a><b>two</b></a>", &mut filter).unwrap();

        assert_eq!(filter.fragments_matched(), 1);
        assert_eq!(filter.match_counts()[0].1, 1);
    }

    #[test]
    fn test_nested_matches_not_evaluated_while_capturing() {
        let mut outer = EventRecorder::new();
        let mut inner = EventRecorder::new();
        let mut filter = PathFragmentFilter::new()
            .with_handler(spec("//section"), &mut outer)
            .with_handler(spec("//section/section"), &mut inner);

        parse_str(
            "<doc><section><section>deep</section></section></doc>",
            &mut filter,
        )
        .unwrap();
        assert_eq!(filter.fragments_matched(), 1);
        drop(filter);

        assert_eq!(outer.events().len(), 5);
        assert!(inner.events().is_empty());
    }

    #[test]
    fn test_first_match_policy() {
        let mut first = EventRecorder::new();
        let mut second = EventRecorder::new();
        let mut filter = PathFragmentFilter::new()
            .with_handler(spec("/a/b"), &mut first)
            .with_handler(spec("//b"), &mut second);
        parse_str("<a><b/></a>", &mut filter).unwrap();
        drop(filter);

        assert_eq!(first.events(), &[start("b"), end("b")]);
        assert!(second.events().is_empty());
    }

    #[test]
    fn test_all_matches_policy() {
        let mut first = EventRecorder::new();
        let mut second = EventRecorder::new();
        let mut filter = PathFragmentFilter::with_policy(MatchPolicy::AllMatches)
            .with_handler(spec("/a/b"), &mut first)
            .with_handler(spec("//b"), &mut second);
        parse_str("<a><b>t</b></a>", &mut filter).unwrap();

        let counts: Vec<usize> = filter.match_counts().iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![1, 1]);
        assert_eq!(filter.fragments_matched(), 1);
        drop(filter);

        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn test_reject_ambiguous_policy() {
        let mut filter = PathFragmentFilter::with_policy(MatchPolicy::RejectAmbiguous)
            .with_handler(spec("/a/b"), EventRecorder::new())
            .with_handler(spec("//b"), EventRecorder::new());
        let err = parse_str("<a><b/></a>", &mut filter).unwrap_err();

        match err {
            FragmentError::AmbiguousMatch { path, specs } => {
                assert_eq!(path, "/a/b");
                assert_eq!(specs, vec!["/a/b".to_string(), "//b".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reject_policy_allows_single_match() {
        let mut filter = PathFragmentFilter::with_policy(MatchPolicy::RejectAmbiguous)
            .with_handler(spec("/a/b"), EventRecorder::new())
            .with_handler(spec("/a/c"), EventRecorder::new());
        parse_str("<a><b/><c/></a>", &mut filter).unwrap();
        assert_eq!(filter.fragments_matched(), 2);
    }

    #[test]
    fn test_namespaced_spec() {
        let mut recorder = EventRecorder::new();
        let mut filter =
            PathFragmentFilter::new().with_handler(spec("/{urn:x}a/{urn:x}b"), &mut recorder);
        parse_str(
            r#"<a xmlns="urn:x"><b>in</b><b xmlns="">out</b></a>"#,
            &mut filter,
        )
        .unwrap();
        assert_eq!(filter.fragments_matched(), 1);
        drop(filter);

        assert_eq!(recorder.events()[1], text("in"));
    }

    #[test]
    fn test_matching_start_carries_attributes() {
        let mut recorder = EventRecorder::new();
        let mut filter = PathFragmentFilter::new().with_handler(spec("//item"), &mut recorder);
        parse_str(r#"<list><item id="7"/></list>"#, &mut filter).unwrap();
        drop(filter);

        let RecordedEvent::Start(start) = &recorder.events()[0] else {
            panic!("expected start event");
        };
        assert_eq!(start.attribute("", "id"), Some("7"));
    }

    #[test]
    fn test_handler_error_aborts_parse() {
        struct Failing;

        impl ContentHandler for Failing {
            fn start_element(&mut self, _element: &StartElement) -> Result<()> {
                Err(FragmentError::invalid_value("test", "x", "always fails"))
            }

            fn end_element(&mut self, _name: &QName) -> Result<()> {
                Ok(())
            }

            fn characters(&mut self, _text: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut filter = PathFragmentFilter::new().with_handler(spec("/a"), Failing);
        let err = parse_str("<a/>", &mut filter).unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn test_end_without_start_is_underflow() {
        let mut filter = PathFragmentFilter::new();
        let err = filter.end_element(&QName::local("a")).unwrap_err();
        assert!(matches!(err, FragmentError::PathUnderflow(_)));
    }
}
