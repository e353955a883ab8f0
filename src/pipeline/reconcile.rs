use std::path::Path;

use crate::domain::{Hyperlink, Status};

/// Order-preserving partition of hyperlinks into found and missing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    found: Vec<Hyperlink>,
    missing: Vec<Hyperlink>,
}

impl Resolution {
    /// Links whose target basename exists in the source directory, in
    /// original document order.
    #[must_use]
    pub fn found(&self) -> &[Hyperlink] {
        &self.found
    }

    /// Links whose target basename does not exist in the source directory,
    /// in original document order.
    #[must_use]
    pub fn missing(&self) -> &[Hyperlink] {
        &self.missing
    }

    /// The status of an individual link from the original sequence.
    #[must_use]
    pub fn status(&self, link: &Hyperlink) -> Status {
        if self.found.iter().any(|found| found.target() == link.target()) {
            Status::Found
        } else {
            Status::Missing
        }
    }
}

/// Partitions `links` by existence of each target's basename directly in
/// `source_dir`.
///
/// A pure predicate partition: no file contents are read, no directories are
/// walked (a referenced file must sit directly in the source directory), and
/// running it twice against an unchanged directory yields identical results.
#[must_use]
pub fn resolve(links: &[Hyperlink], source_dir: &Path) -> Resolution {
    let (found, missing) = links
        .iter()
        .cloned()
        .partition(|link| source_dir.join(link.basename()).is_file());
    Resolution { found, missing }
}
