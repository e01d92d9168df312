//! Handler that captures a whole subtree as a structured value.

use serde::Serialize;

use crate::error::{FragmentError, Result};
use crate::fragment::handler::FragmentHandler;
use crate::types::{Attribute, QName, StartElement};

/// An element of a captured fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentNode {
    pub name: QName,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FragmentContent>,
}

/// Child content of a [`FragmentNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FragmentContent {
    Element(FragmentNode),
    Text(String),
}

impl FragmentNode {
    #[must_use]
    pub fn new(start: &StartElement) -> Self {
        Self {
            name: start.name.clone(),
            attributes: start.attributes.clone(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by namespace and local name.
    #[must_use]
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &FragmentNode> {
        self.children.iter().filter_map(|c| match c {
            FragmentContent::Element(node) => Some(node),
            FragmentContent::Text(_) => None,
        })
    }

    /// First child element with the given un-namespaced local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&FragmentNode> {
        self.elements().find(|n| n.name.is("", local))
    }

    /// Concatenated text of this element and all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                FragmentContent::Text(text) => out.push_str(text),
                FragmentContent::Element(node) => node.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(FragmentContent::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(FragmentContent::Text(text.to_string()));
        }
    }

    /// Drop whitespace-only text between child elements.
    fn finish(mut self) -> Self {
        if self.elements().next().is_some() {
            self.children.retain(|c| match c {
                FragmentContent::Text(text) => !text.trim().is_empty(),
                FragmentContent::Element(_) => true,
            });
        }
        self
    }
}

/// Builds a [`FragmentNode`] tree for every matched subtree.
#[derive(Debug, Default)]
pub struct TreeFragmentHandler {
    stack: Vec<FragmentNode>,
}

impl TreeFragmentHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pop(&mut self, name: &QName) -> Result<FragmentNode> {
        self.stack
            .pop()
            .map(FragmentNode::finish)
            .ok_or_else(|| FragmentError::PathUnderflow(name.to_string()))
    }
}

impl FragmentHandler for TreeFragmentHandler {
    type Value = FragmentNode;

    fn begin(&mut self, element: &StartElement) -> Result<()> {
        self.stack.clear();
        self.stack.push(FragmentNode::new(element));
        Ok(())
    }

    fn start_nested(&mut self, element: &StartElement) -> Result<()> {
        self.stack.push(FragmentNode::new(element));
        Ok(())
    }

    fn end_nested(&mut self, name: &QName) -> Result<()> {
        let node = self.pop(name)?;
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(FragmentContent::Element(node));
                Ok(())
            }
            None => Err(FragmentError::PathUnderflow(name.to_string())),
        }
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if let Some(node) = self.stack.last_mut() {
            node.push_text(text);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<FragmentNode> {
        let root_name = self
            .stack
            .first()
            .map(|n| n.name.clone())
            .unwrap_or_else(|| QName::local(""));
        let root = self.pop(&root_name)?;
        if !self.stack.is_empty() {
            return Err(FragmentError::UnexpectedEof {
                depth: self.stack.len(),
            });
        }
        Ok(root)
    }
}
