use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::error;

use super::{Disposition, ItemOutcome};
use crate::domain::{Hyperlink, RunOptions};

/// Copies every resolved PDF into the destination concurrently, one task per
/// item, blocking until all of them finish.
///
/// Each task writes its own destination path, so no synchronization is
/// needed; failures are captured per item and returned rather than merely
/// logged. There is no ordering guarantee between tasks and no timeout: the
/// caller proceeds only once the whole batch has been attempted.
#[must_use]
pub fn copy_all(options: &RunOptions, found: &[Hyperlink]) -> Vec<ItemOutcome> {
    found
        .par_iter()
        .map(|link| {
            let basename = link.basename();
            let source = options.source_dir.join(basename);
            let destination = options.dest_dir.join(basename);
            let disposition = match std::fs::copy(&source, &destination) {
                Ok(_) => Disposition::Copied,
                Err(copy_error) => {
                    error!("failed to copy {basename}: {copy_error}");
                    Disposition::Failed
                }
            };
            ItemOutcome {
                basename: basename.to_string(),
                destination: basename.to_string(),
                disposition,
            }
        })
        .collect()
}
