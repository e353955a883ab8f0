use std::fmt;

/// A document-embedded reference: visible link text plus the target path
/// resolved through the document's relationship table.
///
/// Immutable once extracted. Targets are percent-decoded and separator
/// normalized at extraction time; only PDF targets are retained by the
/// extractor, but the type itself does not enforce that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    display_text: String,
    target: String,
}

impl Hyperlink {
    /// Display text substituted when a hyperlink carries no run text.
    pub const UNNAMED: &'static str = "Unnamed Link";

    /// Creates a hyperlink, substituting [`Self::UNNAMED`] for empty display
    /// text.
    #[must_use]
    pub fn new(display_text: impl Into<String>, target: impl Into<String>) -> Self {
        let mut display_text = display_text.into();
        if display_text.is_empty() {
            display_text = Self::UNNAMED.to_string();
        }
        Self {
            display_text,
            target: target.into(),
        }
    }

    /// The visible link text.
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// The decoded target path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The final path segment of the target, tolerant of either separator
    /// style since relationship targets may carry Windows-style paths.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.target
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.target)
    }

    /// Whether the target refers to a PDF file (case-insensitive suffix
    /// test, so `.PDF` targets are included).
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.target.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// Whether a referenced file exists in the source directory at
/// reconciliation time.
///
/// Derived, never stored: a second reconciliation against a changed
/// directory may flip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Status {
    /// The target's basename exists in the source directory.
    Found,
    /// The target's basename does not exist in the source directory.
    Missing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "Found"),
            Self::Missing => write!(f, "Missing"),
        }
    }
}
