//! Domain models for dossier assembly.
//!
//! These types are derived per run and held in memory only; nothing survives
//! across runs. Re-running recomputes everything from the document and the
//! filesystem as they are at that moment.

/// Hyperlinks and their resolution status.
pub mod hyperlink;
pub use hyperlink::{Hyperlink, Status};

/// Document-number assignment.
pub mod numbering;
pub use numbering::{DocumentNumber, Numbering};

mod options;
pub use options::RunOptions;
