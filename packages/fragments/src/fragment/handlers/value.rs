//! Handlers for simple elements holding a single typed value.

use crate::converters::{
    convert_optional, BooleanConverter, Converter, DateConverter, DateTimeConverter,
    DecimalConverter, IntegerConverter, TextConverter,
};
use crate::error::{FragmentError, Result};
use crate::fragment::handler::FragmentHandler;
use crate::types::{QName, StartElement};

/// Accumulates the text of a simple element and converts it on close.
///
/// Blank content yields `None`. Content the converter rejects is an
/// `InvalidValue` error carrying the offending text. Child elements are not
/// allowed inside a value element.
#[derive(Debug, Clone, Default)]
pub struct ValueFragmentHandler<C> {
    converter: C,
    element: Option<QName>,
    text: String,
}

pub type TextValueHandler = ValueFragmentHandler<TextConverter>;
pub type DateValueHandler = ValueFragmentHandler<DateConverter>;
pub type DateTimeValueHandler = ValueFragmentHandler<DateTimeConverter>;
pub type IntegerValueHandler = ValueFragmentHandler<IntegerConverter>;
pub type DecimalValueHandler = ValueFragmentHandler<DecimalConverter>;
pub type BooleanValueHandler = ValueFragmentHandler<BooleanConverter>;

impl<C: Converter> ValueFragmentHandler<C> {
    #[must_use]
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            element: None,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn converter(&self) -> &C {
        &self.converter
    }
}

impl<C: Converter> FragmentHandler for ValueFragmentHandler<C> {
    type Value = Option<C::Output>;

    fn begin(&mut self, element: &StartElement) -> Result<()> {
        self.element = Some(element.name.clone());
        self.text.clear();
        Ok(())
    }

    fn start_nested(&mut self, element: &StartElement) -> Result<()> {
        Err(FragmentError::NestedElement {
            element: element.name.to_string(),
            parent: self
                .element
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    fn end(&mut self) -> Result<Self::Value> {
        let text = std::mem::take(&mut self.text);
        convert_optional(&self.converter, Some(text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::ContentToFragmentAdapter;
    use crate::path::PathSpec;
    use crate::xml::parse_str;
    use crate::PathFragmentFilter;
    use chrono::NaiveDate;

    fn run<C: Converter>(xml: &str, spec: &str, converter: C) -> Result<Vec<Option<C::Output>>> {
        let mut adapter = ContentToFragmentAdapter::new(ValueFragmentHandler::new(converter));
        let mut filter = PathFragmentFilter::new();
        filter.register(PathSpec::parse(spec)?, &mut adapter);
        parse_str(xml, &mut filter)?;
        drop(filter);
        Ok(adapter.into_values())
    }

    #[test]
    fn test_date_value() {
        let values = run("<r><d>2009-01-01</d></r>", "/r/d", DateConverter::default()).unwrap();
        assert_eq!(values, vec![NaiveDate::from_ymd_opt(2009, 1, 1)]);
    }

    #[test]
    fn test_date_empty_is_none() {
        let values = run("<r><d></d><d/><d>  </d></r>", "/r/d", DateConverter::default()).unwrap();
        assert_eq!(values, vec![None, None, None]);
    }

    #[test]
    fn test_date_invalid_is_error() {
        let err = run("<r><d>not-a-date</d></r>", "/r/d", DateConverter::default()).unwrap_err();
        match err {
            FragmentError::InvalidValue { kind, content, .. } => {
                assert_eq!(kind, "date");
                assert_eq!(content, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trimmed_text_with_entities() {
        let values = run("<r><t>\n  Fish &amp; Chips \n</t></r>", "//t", TextConverter).unwrap();
        assert_eq!(values, vec![Some("Fish & Chips".to_string())]);
    }

    #[test]
    fn test_nested_element_rejected() {
        let err = run("<r><n>1<b>2</b></n></r>", "/r/n", IntegerConverter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected child element <b> inside value element <n>"
        );
    }

    #[test]
    fn test_handler_reused_between_fragments() {
        let values = run(
            "<r><n>1</n><n>-2</n><n/></r>",
            "/r/n",
            IntegerConverter,
        )
        .unwrap();
        assert_eq!(values, vec![Some(1), Some(-2), None]);
    }

    #[test]
    fn test_boolean_and_decimal() {
        let flags = run("<r><f>true</f><f>0</f></r>", "//f", BooleanConverter).unwrap();
        assert_eq!(flags, vec![Some(true), Some(false)]);

        let amounts = run("<r><a>12.5</a></r>", "//a", DecimalConverter).unwrap();
        assert_eq!(amounts, vec![Some(12.5)]);
    }
}
