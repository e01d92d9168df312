//! The raw streaming callback interface.

use crate::error::Result;
use crate::types::{QName, StartElement};

/// Receiver of streaming XML events in document order.
///
/// Every callback may fail; an error aborts the parse and is returned to
/// the caller of the reader unchanged.
pub trait ContentHandler {
    /// Called once before the first element.
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once after the root element has closed.
    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// An element opened.
    fn start_element(&mut self, element: &StartElement) -> Result<()>;

    /// An element closed.
    fn end_element(&mut self, name: &QName) -> Result<()>;

    /// A run of character data. Adjacent text, CDATA and references are
    /// delivered as one call.
    fn characters(&mut self, text: &str) -> Result<()>;
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_document(&mut self) -> Result<()> {
        (**self).start_document()
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        (**self).start_element(element)
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        (**self).end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        (**self).characters(text)
    }
}

impl<H: ContentHandler + ?Sized> ContentHandler for Box<H> {
    fn start_document(&mut self) -> Result<()> {
        (**self).start_document()
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        (**self).start_element(element)
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        (**self).end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        (**self).characters(text)
    }
}

/// A recorded event, mostly useful for tests and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    StartDocument,
    EndDocument,
    Start(StartElement),
    End(QName),
    Text(String),
}

/// Handler that records every event it receives.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<RecordedEvent>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }
}

impl ContentHandler for EventRecorder {
    fn start_document(&mut self) -> Result<()> {
        self.events.push(RecordedEvent::StartDocument);
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push(RecordedEvent::EndDocument);
        Ok(())
    }

    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        self.events.push(RecordedEvent::Start(element.clone()));
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        self.events.push(RecordedEvent::End(name.clone()));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.events.push(RecordedEvent::Text(text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(handler: &mut impl ContentHandler) -> Result<()> {
        handler.start_element(&StartElement::new(QName::local("a")))?;
        handler.characters("x")?;
        handler.end_element(&QName::local("a"))
    }

    #[test]
    fn test_recorder_through_mut_reference() {
        let mut recorder = EventRecorder::new();
        {
            let mut borrowed = &mut recorder;
            drive(&mut borrowed).unwrap();
        }
        assert_eq!(
            recorder.events(),
            &[
                RecordedEvent::Start(StartElement::new(QName::local("a"))),
                RecordedEvent::Text("x".to_string()),
                RecordedEvent::End(QName::local("a")),
            ]
        );
    }

    #[test]
    fn test_recorder_through_box() {
        let mut boxed: Box<dyn ContentHandler> = Box::new(EventRecorder::new());
        drive(&mut boxed).unwrap();
    }
}
