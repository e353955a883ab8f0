//! The orchestration pipeline.
//!
//! Stages, in order: reconcile the extracted links against the source
//! directory, assign document numbers once, transform (or plainly copy) the
//! resolved PDFs into the destination, copy the input document alongside
//! them, and write the spreadsheet index. Per-item failures degrade that
//! item and are recorded; only destination setup and the report can abort a
//! run.

use std::{fs, io, path::PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    domain::{Hyperlink, Numbering, RunOptions},
    pdf::FontCatalog,
    report,
};

/// Concurrent verbatim copies for runs without renaming or cover pages.
pub mod fanout;

/// Partitioning hyperlinks by presence in the source directory.
pub mod reconcile;
pub use reconcile::{Resolution, resolve};

/// Sequential stamping and renaming of resolved PDFs.
pub mod transform;

/// How a resolved item ended up in (or absent from) the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Cover page prepended (and the numbered name applied when renaming is
    /// enabled).
    Stamped,
    /// Copied verbatim.
    Copied,
    /// Transformation failed; the original was copied verbatim instead.
    FallbackCopied,
    /// Both the transformation and the fallback copy failed; the item is
    /// absent from the destination.
    Failed,
}

/// The outcome of processing a single resolved link.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    /// Source basename of the item.
    pub basename: String,
    /// Filename the item was written under in the destination directory.
    pub destination: String,
    /// What happened to the item.
    pub disposition: Disposition,
}

/// Aggregated result of one run, suitable for both the human summary and
/// the JSON output.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Path of the written spreadsheet index.
    pub report: PathBuf,
    /// Number of PDF hyperlinks extracted from the document.
    pub links: usize,
    /// Number of links whose PDF was found in the source directory.
    pub found: usize,
    /// Number of links whose PDF was missing from the source directory.
    pub missing: usize,
    /// Per-item processing outcomes, in processing order.
    pub outcomes: Vec<ItemOutcome>,
}

impl RunSummary {
    /// Number of items that reached the destination in some form.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.disposition != Disposition::Failed)
            .count()
    }
}

/// Error that aborts a run outright.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The destination directory could not be created.
    #[error("failed to prepare destination directory: {0}")]
    Destination(#[from] io::Error),
    /// The spreadsheet index could not be written.
    #[error(transparent)]
    Report(#[from] report::ReportError),
}

/// Runs the processing stages against an already-extracted, already-resolved
/// link set.
///
/// The operator decision about missing files happens before this call; the
/// resolution is taken as given. `on_item` is invoked after each item the
/// sequential transform stage finishes, in order, and drives progress
/// reporting at the boundary.
///
/// # Errors
///
/// Returns [`PipelineError`] when the destination directory cannot be
/// created or the report cannot be written. Per-item failures never abort
/// the run; they are recorded in the summary instead.
pub fn execute(
    options: &RunOptions,
    links: &[Hyperlink],
    resolution: &Resolution,
    on_item: impl FnMut(&ItemOutcome),
) -> Result<RunSummary, PipelineError> {
    fs::create_dir_all(&options.dest_dir)?;

    // Assigned once; the transform stage and the report writer both borrow
    // this same mapping, so the filenames they produce can never drift.
    let numbering = Numbering::assign(resolution.found());

    let outcomes = if resolution.found().is_empty() {
        info!("no resolved PDFs to process");
        Vec::new()
    } else if options.wants_transform() {
        let catalog = if options.cover {
            FontCatalog::system()
        } else {
            FontCatalog::empty()
        };
        transform::process(options, resolution.found(), &numbering, &catalog, on_item)
    } else {
        fanout::copy_all(options, resolution.found())
    };

    copy_input_document(options);
    let report = report::write(options, links, resolution, &numbering)?;
    info!("report written to {}", report.display());

    Ok(RunSummary {
        report,
        links: links.len(),
        found: resolution.found().len(),
        missing: resolution.missing().len(),
        outcomes,
    })
}

/// The input document rides along with the PDFs so the destination folder is
/// self-contained. Failure here degrades the run, it does not abort it.
fn copy_input_document(options: &RunOptions) {
    let Some(name) = options.document.file_name() else {
        return;
    };
    if let Err(error) = fs::copy(&options.document, options.dest_dir.join(name)) {
        warn!(
            "failed to copy {} into the destination: {error}",
            options.document.display()
        );
    }
}
