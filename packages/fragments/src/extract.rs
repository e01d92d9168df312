//! Extraction entry points that tie the event source, filter and handlers
//! together.

use std::fmt;
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::fragment::{ContentToFragmentAdapter, FragmentHandler, MatchPolicy, PathFragmentFilter};
use crate::http::{create_client, fetch_document};
use crate::path::PathSpec;
use crate::xml::{parse_file, parse_reader, parse_str, ContentHandler};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A local file.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl Source {
    /// Interpret a command-line argument as a URL or a file path.
    ///
    /// # Examples
    /// ```
    /// use sax_fragments::extract::Source;
    ///
    /// assert!(matches!(Source::parse("https://example.org/a.xml"), Source::Url(_)));
    /// assert!(matches!(Source::parse("data/a.xml"), Source::File(_)));
    /// ```
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Stream the document into a content handler.
    ///
    /// Files are read incrementally; URLs are downloaded first, within the
    /// size limit from `settings`.
    pub fn parse_into<H>(&self, settings: &Settings, handler: &mut H) -> Result<()>
    where
        H: ContentHandler + ?Sized,
    {
        match self {
            Self::File(path) => parse_file(path, handler),
            Self::Url(url) => {
                let client = create_client(settings.http_timeout_secs)?;
                let bytes = fetch_document(&client, url, settings.max_response_size)?;
                parse_reader(bytes.as_slice(), handler)
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Extract one value per subtree matching `spec` from an in-memory document.
///
/// # Examples
/// ```
/// use sax_fragments::extract::extract_str;
/// use sax_fragments::fragment::handlers::DateValueHandler;
/// use sax_fragments::path::PathSpec;
///
/// let xml = "<invoice><date>2009-01-01</date></invoice>";
/// let spec = PathSpec::parse("/invoice/date").unwrap();
/// let dates = extract_str(xml, spec, DateValueHandler::default()).unwrap();
/// assert_eq!(dates[0].unwrap().to_string(), "2009-01-01");
/// ```
pub fn extract_str<H: FragmentHandler>(
    xml: &str,
    spec: PathSpec,
    handler: H,
) -> Result<Vec<H::Value>> {
    run_extraction(spec, handler, |filter| parse_str(xml, filter))
}

/// Extract one value per subtree matching `spec` from a file or URL.
pub fn extract_source<H: FragmentHandler>(
    source: &Source,
    settings: &Settings,
    spec: PathSpec,
    handler: H,
) -> Result<Vec<H::Value>> {
    run_extraction(spec, handler, |filter| source.parse_into(settings, filter))
}

/// Extract values for several paths at once with a shared handler.
///
/// Every path gets its own adapter; the result holds the values per path,
/// in registration order.
pub fn extract_many<H, F>(
    source: &Source,
    settings: &Settings,
    specs: Vec<PathSpec>,
    policy: MatchPolicy,
    make_handler: F,
) -> Result<Vec<(PathSpec, Vec<H::Value>)>>
where
    H: FragmentHandler,
    F: Fn() -> H,
{
    let mut adapters: Vec<ContentToFragmentAdapter<H>> = specs
        .iter()
        .map(|_| ContentToFragmentAdapter::new(make_handler()))
        .collect();

    {
        let mut filter = PathFragmentFilter::with_policy(policy);
        for (spec, adapter) in specs.iter().zip(adapters.iter_mut()) {
            filter.register(spec.clone(), adapter);
        }
        source.parse_into(settings, &mut filter)?;
        tracing::debug!(
            source = %source,
            fragments = filter.fragments_matched(),
            "Extraction finished"
        );
    }

    Ok(specs
        .into_iter()
        .zip(adapters.into_iter().map(ContentToFragmentAdapter::into_values))
        .collect())
}

fn run_extraction<H, P>(spec: PathSpec, handler: H, parse: P) -> Result<Vec<H::Value>>
where
    H: FragmentHandler,
    P: FnOnce(&mut PathFragmentFilter<'_>) -> Result<()>,
{
    let mut adapter = ContentToFragmentAdapter::new(handler);
    {
        let mut filter = PathFragmentFilter::new().with_handler(spec, &mut adapter);
        parse(&mut filter)?;
    }
    Ok(adapter.into_values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::handlers::{IntegerValueHandler, TextValueHandler};

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("HTTPS://example.org/x"),
            Source::Url("HTTPS://example.org/x".to_string())
        );
        assert_eq!(
            Source::parse("./in.xml"),
            Source::File(PathBuf::from("./in.xml"))
        );
    }

    #[test]
    fn test_extract_str() {
        let values = extract_str(
            "<r><n>1</n><x><n>9</n></x><n>2</n></r>",
            PathSpec::parse("/r/n").unwrap(),
            IntegerValueHandler::default(),
        )
        .unwrap();
        assert_eq!(values, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_extract_str_propagates_parse_error() {
        let result = extract_str(
            "<r><n>1</n>",
            PathSpec::parse("/r/n").unwrap(),
            TextValueHandler::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let xml = "<a><b><c>one</c></b><b><c>two</c></b></a>";
        let run = || {
            extract_str(
                xml,
                PathSpec::parse("//c").unwrap(),
                TextValueHandler::default(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
