//! HTML version heuristic
//!
//! Classifies the markup dialect from DOCTYPE and version markers. Rules are
//! evaluated in order and the first match wins.

use std::fmt;

/// Markup dialect detected for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlVersion {
    Html5,
    Xhtml11,
    Xhtml10Strict,
    Xhtml10Transitional,
    Xhtml10,
    Xhtml,
    Html401Strict,
    Html401Transitional,
    Html401,
    Unknown,
}

impl HtmlVersion {
    /// Returns the display label for this version
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html5 => "HTML5",
            Self::Xhtml11 => "XHTML 1.1",
            Self::Xhtml10Strict => "XHTML 1.0 Strict",
            Self::Xhtml10Transitional => "XHTML 1.0 Transitional",
            Self::Xhtml10 => "XHTML 1.0",
            Self::Xhtml => "XHTML",
            Self::Html401Strict => "HTML 4.01 Strict",
            Self::Html401Transitional => "HTML 4.01 Transitional",
            Self::Html401 => "HTML 4.01",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HtmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the HTML version of a document's markup
///
/// # Rules
///
/// | Order | Condition | Result |
/// |-------|-----------|--------|
/// | 1 | contains `<!doctype html>` (any case) | HTML5 |
/// | 2 | contains `xhtml` (any case) | XHTML, refined by `1.1` / `1.0` + `Strict` / `Transitional` |
/// | 3 | contains `HTML 4.01` | HTML 4.01, refined by `Strict` / `Transitional` |
/// | 4 | otherwise | Unknown |
///
/// Only the `<!doctype html>` and `xhtml` checks ignore case; the version
/// and flavor markers are matched exactly.
pub fn detect_html_version(markup: &str) -> HtmlVersion {
    let lower = markup.to_ascii_lowercase();

    if lower.contains("<!doctype html>") {
        return HtmlVersion::Html5;
    }

    if lower.contains("xhtml") {
        if markup.contains("1.1") {
            return HtmlVersion::Xhtml11;
        }
        if markup.contains("1.0") {
            return match flavor(markup) {
                Flavor::Strict => HtmlVersion::Xhtml10Strict,
                Flavor::Transitional => HtmlVersion::Xhtml10Transitional,
                Flavor::Plain => HtmlVersion::Xhtml10,
            };
        }
        return HtmlVersion::Xhtml;
    }

    if markup.contains("HTML 4.01") {
        return match flavor(markup) {
            Flavor::Strict => HtmlVersion::Html401Strict,
            Flavor::Transitional => HtmlVersion::Html401Transitional,
            Flavor::Plain => HtmlVersion::Html401,
        };
    }

    HtmlVersion::Unknown
}

enum Flavor {
    Strict,
    Transitional,
    Plain,
}

fn flavor(markup: &str) -> Flavor {
    if markup.contains("Strict") {
        Flavor::Strict
    } else if markup.contains("Transitional") {
        Flavor::Transitional
    } else {
        Flavor::Plain
    }
}
