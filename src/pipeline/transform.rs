use std::{fs, path::Path};

use lopdf::Document;
use tracing::error;

use super::{Disposition, ItemOutcome};
use crate::{
    domain::{DocumentNumber, Hyperlink, Numbering, RunOptions},
    pdf::{EmbeddableFont, FontCatalog, compose, cover},
};

/// Error stamping a single PDF. One item's failure never aborts the batch;
/// it is logged and answered with a verbatim-copy fallback.
#[derive(Debug, thiserror::Error)]
enum StampError {
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no cover page could be rendered")]
    Cover,
    #[error("item has no assigned number")]
    Unnumbered,
}

/// Processes the resolved links strictly sequentially: each item is stamped
/// with its numbered cover (when enabled), written under its destination
/// filename, and reported through `on_item` before the next one starts.
///
/// The shaping font is resolved once, up front, against the label plus every
/// digit, so per-item rendering never searches the font database.
pub(crate) fn process(
    options: &RunOptions,
    found: &[Hyperlink],
    numbering: &Numbering,
    catalog: &FontCatalog,
    mut on_item: impl FnMut(&ItemOutcome),
) -> Vec<ItemOutcome> {
    let cover_font = options
        .cover
        .then(|| catalog.face_covering(&format!("{} 0123456789", options.label)))
        .flatten();

    let mut outcomes = Vec::with_capacity(found.len());
    for link in found {
        let basename = link.basename();
        let destination_name =
            numbering.destination_filename(basename, &options.label, options.rename);
        let source = options.source_dir.join(basename);
        let destination = options.dest_dir.join(&destination_name);

        let attempt = if options.cover {
            stamp(
                &source,
                &destination,
                &options.label,
                numbering.get(basename),
                cover_font.as_ref(),
            )
        } else {
            // Renaming without a cover page is a plain copy under the new name.
            fs::copy(&source, &destination)
                .map(|_| ())
                .map_err(StampError::from)
        };

        let disposition = match attempt {
            Ok(()) => {
                if options.cover {
                    Disposition::Stamped
                } else {
                    Disposition::Copied
                }
            }
            Err(stamp_error) => {
                error!("failed to process {basename}: {stamp_error}");
                match fs::copy(&source, &destination) {
                    Ok(_) => Disposition::FallbackCopied,
                    Err(copy_error) => {
                        error!("fallback copy of {basename} also failed: {copy_error}");
                        Disposition::Failed
                    }
                }
            }
        };

        let outcome = ItemOutcome {
            basename: basename.to_string(),
            destination: destination_name,
            disposition,
        };
        on_item(&outcome);
        outcomes.push(outcome);
    }
    outcomes
}

/// Loads the source PDF, prepends the rendered cover as page 1, and saves
/// the result to the destination path. The source file is never touched.
fn stamp(
    source: &Path,
    destination: &Path,
    label: &str,
    number: Option<DocumentNumber>,
    font: Option<&EmbeddableFont>,
) -> Result<(), StampError> {
    let number = number.ok_or(StampError::Unnumbered)?;
    let mut document = Document::load(source)?;
    let cover = cover::render(label, number, font).ok_or(StampError::Cover)?;
    compose::prepend_pages(&mut document, &cover)?;
    document.save(destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::pdf::compose::tests::sample_document;

    fn options(root: &Path, rename: bool, cover: bool) -> RunOptions {
        let source_dir = root.join("source");
        let dest_dir = root.join("dest");
        fs::create_dir_all(&source_dir).unwrap();
        fs::create_dir_all(&dest_dir).unwrap();
        RunOptions {
            document: root.join("input.docx"),
            source_dir,
            dest_dir,
            rename,
            cover,
            label: "Document No.".to_string(),
        }
    }

    fn write_pdf(directory: &Path, name: &str, pages: u32) {
        sample_document(pages, "Page")
            .save(directory.join(name))
            .expect("failed to write fixture pdf");
    }

    fn run(options: &RunOptions, found: &[Hyperlink]) -> Vec<ItemOutcome> {
        let numbering = Numbering::assign(found);
        process(
            options,
            found,
            &numbering,
            &FontCatalog::empty(),
            |_| {},
        )
    }

    #[test]
    fn stamped_output_gains_one_leading_page() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path(), true, true);
        write_pdf(&options.source_dir, "a.pdf", 3);

        let found = vec![Hyperlink::new("A", "a.pdf")];
        let outcomes = run(&options, &found);

        assert_eq!(outcomes[0].disposition, Disposition::Stamped);
        assert_eq!(outcomes[0].destination, "Document No. 001 - a.pdf");
        let written = Document::load(options.dest_dir.join(&outcomes[0].destination)).unwrap();
        assert_eq!(written.get_pages().len(), 4);
        let first_page = *written.get_pages().get(&1).unwrap();
        let content = written.get_page_content(first_page).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("001"));
    }

    #[test]
    fn rename_without_cover_copies_bytes_verbatim() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path(), true, false);
        write_pdf(&options.source_dir, "a.pdf", 2);

        let found = vec![Hyperlink::new("A", "a.pdf")];
        let outcomes = run(&options, &found);

        assert_eq!(outcomes[0].disposition, Disposition::Copied);
        let original = fs::read(options.source_dir.join("a.pdf")).unwrap();
        let copied = fs::read(options.dest_dir.join("Document No. 001 - a.pdf")).unwrap();
        assert_eq!(original, copied);
    }

    #[test]
    fn corrupt_source_falls_back_to_verbatim_copy() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path(), true, true);
        write_pdf(&options.source_dir, "good.pdf", 1);
        fs::write(options.source_dir.join("bad.pdf"), b"not a pdf at all").unwrap();

        let found = vec![
            Hyperlink::new("Bad", "bad.pdf"),
            Hyperlink::new("Good", "good.pdf"),
        ];
        let outcomes = run(&options, &found);

        assert_eq!(outcomes[0].disposition, Disposition::FallbackCopied);
        let fallback = fs::read(options.dest_dir.join(&outcomes[0].destination)).unwrap();
        assert_eq!(fallback, b"not a pdf at all");

        // The sibling item still gets a proper cover.
        assert_eq!(outcomes[1].disposition, Disposition::Stamped);
        let stamped = Document::load(options.dest_dir.join(&outcomes[1].destination)).unwrap();
        assert_eq!(stamped.get_pages().len(), 2);
    }

    #[test]
    fn duplicate_basenames_share_one_destination_name() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path(), true, true);
        write_pdf(&options.source_dir, "a.pdf", 1);

        let found = vec![Hyperlink::new("1", "a.pdf"), Hyperlink::new("2", "x/a.pdf")];
        let outcomes = run(&options, &found);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].destination, outcomes[1].destination);
    }

    #[test]
    fn items_are_reported_in_order() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path(), false, true);
        write_pdf(&options.source_dir, "a.pdf", 1);
        write_pdf(&options.source_dir, "b.pdf", 1);

        let found = vec![Hyperlink::new("1", "a.pdf"), Hyperlink::new("2", "b.pdf")];
        let numbering = Numbering::assign(&found);
        let mut seen = Vec::new();
        process(&options, &found, &numbering, &FontCatalog::empty(), |outcome| {
            seen.push(outcome.basename.clone());
        });
        assert_eq!(seen, ["a.pdf", "b.pdf"]);
    }
}
