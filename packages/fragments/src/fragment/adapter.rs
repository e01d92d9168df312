//! Bridges raw content callbacks to a [`FragmentHandler`].

use std::fmt;

use super::handler::FragmentHandler;
use crate::error::{FragmentError, Result};
use crate::types::{QName, StartElement};
use crate::xml::ContentHandler;

type ValueCallback<V> = Box<dyn FnMut(&V)>;

/// Adapter that turns the raw [`ContentHandler`] event stream of one or
/// more fragments into [`FragmentHandler`] calls.
///
/// The first start-element opens a fragment (`begin`); deeper elements are
/// relayed as nested events; the end-element that closes the fragment root
/// calls `end` and stores the produced value. Values are kept in document
/// order and can also be observed as they complete through
/// [`ContentToFragmentAdapter::on_value`].
pub struct ContentToFragmentAdapter<H: FragmentHandler> {
    handler: H,
    depth: usize,
    values: Vec<H::Value>,
    on_value: Option<ValueCallback<H::Value>>,
}

impl<H: FragmentHandler> ContentToFragmentAdapter<H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            depth: 0,
            values: Vec::new(),
            on_value: None,
        }
    }

    /// Register a callback invoked with every completed value.
    #[must_use]
    pub fn on_value(mut self, callback: impl FnMut(&H::Value) + 'static) -> Self {
        self.on_value = Some(Box::new(callback));
        self
    }

    /// Whether a fragment is currently open.
    #[must_use]
    pub fn in_fragment(&self) -> bool {
        self.depth > 0
    }

    /// Values of all completed fragments, in document order.
    #[must_use]
    pub fn values(&self) -> &[H::Value] {
        &self.values
    }

    /// Value of the most recently completed fragment.
    #[must_use]
    pub fn last_value(&self) -> Option<&H::Value> {
        self.values.last()
    }

    /// Remove and return the collected values.
    pub fn take_values(&mut self) -> Vec<H::Value> {
        std::mem::take(&mut self.values)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<H::Value> {
        self.values
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: FragmentHandler> ContentHandler for ContentToFragmentAdapter<H> {
    fn start_document(&mut self) -> Result<()> {
        self.depth = 0;
        Ok(())
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        if self.depth == 0 {
            self.handler.begin(element)?;
        } else {
            self.handler.start_nested(element)?;
        }
        self.depth += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| FragmentError::PathUnderflow(name.to_string()))?;

        if self.depth > 0 {
            return self.handler.end_nested(name);
        }

        let value = self.handler.end()?;
        if let Some(callback) = self.on_value.as_mut() {
            callback(&value);
        }
        self.values.push(value);
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.depth == 0 {
            return Ok(());
        }
        self.handler.characters(text)
    }
}

impl<H> fmt::Debug for ContentToFragmentAdapter<H>
where
    H: FragmentHandler + fmt::Debug,
    H::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentToFragmentAdapter")
            .field("handler", &self.handler)
            .field("depth", &self.depth)
            .field("values", &self.values)
            .field("has_callback", &self.on_value.is_some())
            .finish()
    }
}
