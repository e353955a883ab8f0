//! PDF cover-page generation and page-tree composition.
//!
//! Source PDFs are never parsed beyond what `lopdf` needs to load and merge
//! them; format fidelity comes from the library, not from this crate.

/// Page-tree surgery: prepending cover pages onto existing documents.
pub mod compose;
pub use compose::prepend_pages;

/// Single-page numbered cover generation.
pub mod cover;

/// System font discovery and text shaping for cover pages.
pub mod fonts;
pub use fonts::{EmbeddableFont, FontCatalog};
