//! HTML document parsing and element queries
//!
//! Wraps a `scraper` document and exposes find-all / find-first queries by
//! tag name, attribute existence and attribute value. Queries match elements
//! directly instead of going through CSS selector strings, so building a
//! query can never fail.

use scraper::{ElementRef, Html};

/// Number of leading bytes inspected when sniffing for binary content
const SNIFF_LEN: usize = 1024;

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a response body into a document
    ///
    /// Parsing is tag-soup tolerant: unclosed tags, a missing DOCTYPE or
    /// stray markup never abort parsing. The only rejected input is a body
    /// that is not text at all, detected by a NUL byte in the leading bytes
    /// (the binary-data marker used by MIME sniffing).
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The parsed document
    /// * `Err(String)` - Description of why the body could not be parsed
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        let head = &body[..body.len().min(SNIFF_LEN)];
        if head.contains(&0) {
            return Err("response body is binary data, not HTML text".to_string());
        }

        let text = String::from_utf8_lossy(body);
        Ok(Self::parse_str(&text))
    }

    /// Parses an HTML string into a document
    pub fn parse_str(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns every element matching the query, in document order
    pub fn find_all(&self, query: &Query) -> Vec<ElementRef<'_>> {
        find_within(self.html.root_element(), query)
    }

    /// Returns the first element matching the query, in document order
    pub fn find_first(&self, query: &Query) -> Option<ElementRef<'_>> {
        elements(self.html.root_element()).find(|el| query.matches(el))
    }

    /// Counts the elements matching the query
    pub fn count(&self, query: &Query) -> usize {
        elements(self.html.root_element())
            .filter(|el| query.matches(el))
            .count()
    }

    /// Re-serializes the parsed document as HTML
    pub fn serialize(&self) -> String {
        self.html.html()
    }

    /// Renders the document's DOCTYPE in canonical form, if it has one
    ///
    /// Whitespace and keyword case from the source are normalized away:
    /// `<!doctype  HTML >` renders as `<!DOCTYPE html>`, while public and
    /// system identifiers are kept as `PUBLIC "..." "..."` or `SYSTEM "..."`.
    pub fn doctype(&self) -> Option<String> {
        let doctype = self
            .html
            .tree
            .root()
            .children()
            .find_map(|node| node.value().as_doctype())?;

        let mut rendered = format!("<!DOCTYPE {}", doctype.name());
        let (public_id, system_id) = (doctype.public_id(), doctype.system_id());
        if !public_id.is_empty() {
            rendered.push_str(&format!(" PUBLIC \"{}\"", public_id));
            if !system_id.is_empty() {
                rendered.push_str(&format!(" \"{}\"", system_id));
            }
        } else if !system_id.is_empty() {
            rendered.push_str(&format!(" SYSTEM \"{}\"", system_id));
        }
        rendered.push('>');

        Some(rendered)
    }
}

/// Returns every element below `scope` (including `scope` itself) matching the query
pub fn find_within<'a>(scope: ElementRef<'a>, query: &Query) -> Vec<ElementRef<'a>> {
    elements(scope).filter(|el| query.matches(el)).collect()
}

/// Returns true if any element below `scope` matches the query
pub fn exists_within(scope: ElementRef<'_>, query: &Query) -> bool {
    elements(scope).any(|el| query.matches(&el))
}

/// Returns the whitespace-trimmed text content of an element
pub fn trimmed_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn elements(scope: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    scope.descendants().filter_map(ElementRef::wrap)
}

/// A predicate on a single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrPredicate {
    /// Attribute is present (any value)
    Exists(String),
    /// Attribute value equals the given string exactly
    Equals(String, String),
    /// Attribute value contains the given string (case-sensitive)
    Contains(String, String),
}

impl AttrPredicate {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        match self {
            Self::Exists(name) => value.attr(name).is_some(),
            Self::Equals(name, expected) => value.attr(name) == Some(expected.as_str()),
            Self::Contains(name, needle) => value
                .attr(name)
                .map(|v| v.contains(needle.as_str()))
                .unwrap_or(false),
        }
    }
}

/// An element query: an optional tag name plus attribute predicates
///
/// All predicates must hold for an element to match.
///
/// # Example
///
/// ```
/// use page_lens::analyzer::{Document, Query};
///
/// let doc = Document::parse_str(r#"<form><input type="password" name="pw"></form>"#);
/// let query = Query::tag("input").attr_eq("type", "password");
/// assert_eq!(doc.find_all(&query).len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tag: Option<String>,
    predicates: Vec<AttrPredicate>,
}

impl Query {
    /// Matches elements with the given tag name
    pub fn tag(name: &str) -> Self {
        Self {
            tag: Some(name.to_ascii_lowercase()),
            predicates: Vec::new(),
        }
    }

    /// Requires the attribute to be present
    pub fn has_attr(mut self, name: &str) -> Self {
        self.predicates.push(AttrPredicate::Exists(name.to_string()));
        self
    }

    /// Requires the attribute to equal `value`
    pub fn attr_eq(mut self, name: &str, value: &str) -> Self {
        self.predicates
            .push(AttrPredicate::Equals(name.to_string(), value.to_string()));
        self
    }

    /// Requires the attribute to contain `needle`
    pub fn attr_contains(mut self, name: &str, needle: &str) -> Self {
        self.predicates
            .push(AttrPredicate::Contains(name.to_string(), needle.to_string()));
        self
    }

    /// Returns true if the element satisfies the tag and every predicate
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if let Some(tag) = &self.tag {
            if element.value().name() != tag.as_str() {
                return false;
            }
        }
        self.predicates.iter().all(|p| p.matches(element))
    }
}
