use std::path::PathBuf;

/// Immutable configuration for one pipeline run.
///
/// Built once at the boundary (the CLI) and handed to the pipeline entry
/// point, so the pipeline itself never touches presentation state.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The `.docx` document whose hyperlinks drive the run.
    pub document: PathBuf,
    /// Flat directory searched, non-recursively, for the referenced PDFs.
    pub source_dir: PathBuf,
    /// Directory receiving the PDFs, the spreadsheet index and a copy of the
    /// input document. Created if absent.
    pub dest_dir: PathBuf,
    /// Prefix output filenames with the numbered label.
    pub rename: bool,
    /// Prepend a generated numbered cover page to each PDF.
    pub cover: bool,
    /// Localized "Document Number" label used on covers and in filenames.
    pub label: String,
}

impl RunOptions {
    /// The label used when none is configured.
    pub const DEFAULT_LABEL: &'static str = "المستند رقم";

    /// Whether the run goes through the sequential transform stage.
    ///
    /// With both renaming and cover pages disabled there is nothing to
    /// transform, and resolved files are fanned out as plain copies instead.
    #[must_use]
    pub const fn wants_transform(&self) -> bool {
        self.rename || self.cover
    }
}
