//! Dossier assembly from hyperlinked Word documents.
//!
//! A `.docx` document references PDF files through hyperlinks. This crate
//! extracts those links, reconciles them against a flat source directory,
//! assigns each distinct file a stable serial number, copies the files into a
//! destination directory (optionally stamped with a numbered cover page and
//! renamed), and writes a spreadsheet index with one clickable row per link.

pub mod domain;
pub use domain::{Hyperlink, Numbering, RunOptions, Status};

/// Extraction of PDF hyperlinks from `.docx` packages.
pub mod docx;

/// PDF cover-page generation and page-tree composition.
pub mod pdf;

/// The orchestration pipeline: reconcile, number, transform, report.
pub mod pipeline;
pub use pipeline::{Resolution, RunSummary};

/// The spreadsheet index writer.
pub mod report;
