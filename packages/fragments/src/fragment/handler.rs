//! Fragment handler trait definition.

use crate::error::Result;
use crate::types::{QName, StartElement};

/// Trait for fragment handlers.
///
/// A fragment handler sees one matched subtree at a time: `begin` for the
/// subtree's root element, then the nested events, then `end`, which
/// produces the fragment's value. Handlers are reused for every fragment a
/// filter routes to them, so `begin` must reset any per-fragment state.
pub trait FragmentHandler {
    /// The value produced for each fragment.
    type Value;

    /// The fragment's root element opened.
    fn begin(&mut self, element: &StartElement) -> Result<()>;

    /// A descendant element opened.
    ///
    /// Default implementation ignores nested structure.
    fn start_nested(&mut self, _element: &StartElement) -> Result<()> {
        Ok(())
    }

    /// A descendant element closed.
    fn end_nested(&mut self, _name: &QName) -> Result<()> {
        Ok(())
    }

    /// Character data anywhere inside the fragment.
    fn characters(&mut self, text: &str) -> Result<()>;

    /// The fragment's root element closed; produce the value.
    fn end(&mut self) -> Result<Self::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        nested: usize,
    }

    impl FragmentHandler for CountingHandler {
        type Value = usize;

        fn begin(&mut self, _element: &StartElement) -> Result<()> {
            self.nested = 0;
            Ok(())
        }

        fn start_nested(&mut self, _element: &StartElement) -> Result<()> {
            self.nested += 1;
            Ok(())
        }

        fn characters(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }

        fn end(&mut self) -> Result<usize> {
            Ok(self.nested)
        }
    }

    #[test]
    fn test_handler_trait_defaults() {
        let mut handler = CountingHandler { nested: 7 };
        handler.begin(&StartElement::new(QName::local("a"))).unwrap();
        handler.start_nested(&StartElement::new(QName::local("b"))).unwrap();
        handler.end_nested(&QName::local("b")).unwrap();
        assert_eq!(handler.end().unwrap(), 1);
    }
}
