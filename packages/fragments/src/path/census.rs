//! Survey of the element paths present in a document.

use std::collections::HashMap;

use super::tracker::PathTracker;
use crate::error::Result;
use crate::types::{QName, StartElement};
use crate::xml::ContentHandler;

/// Counts every distinct element path, in first-seen order.
///
/// Useful for discovering which path specifications a document supports.
#[derive(Debug, Default)]
pub struct PathCensus {
    tracker: PathTracker,
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
    max_depth: usize,
}

impl PathCensus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct paths with their occurrence counts.
    #[must_use]
    pub fn paths(&self) -> &[(String, usize)] {
        &self.order
    }

    #[must_use]
    pub fn into_paths(self) -> Vec<(String, usize)> {
        self.order
    }

    /// Deepest nesting seen so far.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl ContentHandler for PathCensus {
    fn start_document(&mut self) -> Result<()> {
        self.tracker.clear();
        Ok(())
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        self.tracker.push(element.name.clone());
        self.max_depth = self.max_depth.max(self.tracker.depth());
        let path = self.tracker.to_string();
        match self.index.get(&path) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(path.clone(), self.order.len());
                self.order.push((path, 1));
            }
        }
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        self.tracker.pop(name).map(|_| ())
    }

    fn characters(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}
