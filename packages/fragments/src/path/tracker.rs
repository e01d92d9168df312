//! Tracks the element path while a document streams past.

use std::fmt;

use crate::error::{FragmentError, Result};
use crate::types::{QName, StartElement};
use crate::xml::ContentHandler;

/// Live stack of the elements enclosing the current parse position.
///
/// The stack depth always equals the nesting depth. On an end-element the
/// closing element is still on top until [`PathTracker::pop`] is called, so
/// consumers can inspect the full path of the element that is closing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTracker {
    stack: Vec<QName>,
}

impl PathTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element.
    pub fn push(&mut self, name: QName) {
        self.stack.push(name);
    }

    /// Leave the innermost element.
    ///
    /// # Errors
    /// `PathUnderflow` when the stack is already empty. This means the
    /// event source sent an unbalanced end-element and the parse must stop.
    pub fn pop(&mut self, name: &QName) -> Result<QName> {
        self.stack
            .pop()
            .ok_or_else(|| FragmentError::PathUnderflow(name.to_string()))
    }

    /// The current path from the root element inwards.
    #[must_use]
    pub fn path(&self) -> &[QName] {
        &self.stack
    }

    /// The innermost open element.
    #[must_use]
    pub fn current(&self) -> Option<&QName> {
        self.stack.last()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Forget all state, ready for another document.
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

/// Renders the path as `/root/{ns}child`.
impl fmt::Display for PathTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stack.is_empty() {
            return f.write_str("/");
        }
        for name in &self.stack {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

impl ContentHandler for PathTracker {
    fn start_document(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        self.push(element.name.clone());
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        self.pop(name).map(|_| ())
    }

    fn characters(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}
