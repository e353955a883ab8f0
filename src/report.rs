//! The spreadsheet index of extracted hyperlinks.
//!
//! One sheet, one row per original hyperlink (missing ones included), a
//! status flag per row and a `file:///` hyperlink into the destination for
//! every found item. The workbook is written once, at the end.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatUnderline, Url, Workbook};

use crate::{
    domain::{Hyperlink, Numbering, RunOptions, Status},
    pipeline::Resolution,
};

/// Name of the spreadsheet written into the destination directory.
pub const REPORT_FILENAME: &str = "extracted_links.xlsx";

/// Column titles, in order.
const HEADERS: [&str; 4] = ["Link Text", "PDF Link", "Document Number", "Status"];

/// Error writing the spreadsheet index.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The spreadsheet library rejected a cell or could not save the file.
    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// The destination directory could not be resolved to an absolute path.
    #[error("failed to resolve destination path: {0}")]
    Path(#[from] std::io::Error),
}

/// Writes the index and returns its path.
///
/// Found rows link to the destination filename produced by the shared
/// numbering, which is exactly the name the transform stage wrote, so the
/// report always points at real artifacts. Missing rows keep an empty
/// number cell.
///
/// # Errors
///
/// Returns [`ReportError`] when the destination directory cannot be made
/// absolute or the workbook cannot be assembled and saved.
pub fn write(
    options: &RunOptions,
    links: &[Hyperlink],
    resolution: &Resolution,
    numbering: &Numbering,
) -> Result<PathBuf, ReportError> {
    let path = options.dest_dir.join(REPORT_FILENAME);
    let destination = std::path::absolute(&options.dest_dir)?;

    let header = Format::new().set_bold();
    let found_status = Format::new().set_background_color(Color::RGB(0x0092_D050));
    let found_cell = Format::new().set_background_color(Color::RGB(0x00E6_FFE6));
    let found_link = Format::new()
        .set_background_color(Color::RGB(0x00E6_FFE6))
        .set_font_color(Color::Blue)
        .set_underline(FormatUnderline::Single);
    let missing_status = Format::new().set_background_color(Color::RGB(0x00FF_6B6B));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("All Links")?;
    for (column, title) in (0u16..).zip(HEADERS) {
        worksheet.write_string_with_format(0, column, title, &header)?;
    }

    for (row, link) in (1u32..).zip(links) {
        let basename = link.basename();
        match resolution.status(link) {
            Status::Found => {
                let destination_name =
                    numbering.destination_filename(basename, &options.label, options.rename);
                let number_label = numbering
                    .get(basename)
                    .map(|number| number.labelled(&options.label))
                    .unwrap_or_default();
                let url = Url::new(file_url(&destination.join(&destination_name)))
                    .set_text(basename);

                worksheet.write_string_with_format(row, 0, link.display_text(), &found_cell)?;
                worksheet.write_url_with_format(row, 1, url, &found_link)?;
                worksheet.write_string_with_format(row, 2, number_label, &found_cell)?;
                worksheet.write_string_with_format(
                    row,
                    3,
                    Status::Found.to_string(),
                    &found_status,
                )?;
            }
            Status::Missing => {
                worksheet.write_string(row, 0, link.display_text())?;
                worksheet.write_string(row, 1, basename)?;
                worksheet.write_string(row, 2, "")?;
                worksheet.write_string_with_format(
                    row,
                    3,
                    Status::Missing.to_string(),
                    &missing_status,
                )?;
            }
        }
    }

    worksheet.autofit();
    workbook.save(&path)?;
    Ok(path)
}

/// A local-file URL for the given absolute path, slash-normalized so the
/// same shape works for Windows drive paths and Unix roots.
fn file_url(path: &Path) -> String {
    let absolute = path.display().to_string().replace('\\', "/");
    format!("file:///{}", absolute.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::Read};

    use tempfile::tempdir;

    use super::*;
    use crate::pipeline::resolve;

    fn read_entry(path: &Path, name: &str) -> String {
        let mut package = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = package.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn options(root: &Path) -> RunOptions {
        let source_dir = root.join("source");
        let dest_dir = root.join("dest");
        std::fs::create_dir_all(&source_dir).unwrap();
        std::fs::create_dir_all(&dest_dir).unwrap();
        RunOptions {
            document: root.join("input.docx"),
            source_dir,
            dest_dir,
            rename: true,
            cover: true,
            label: "Document No.".to_string(),
        }
    }

    #[test]
    fn one_row_per_original_link_including_duplicates_and_missing() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path());
        std::fs::write(options.source_dir.join("a.pdf"), b"pdf").unwrap();

        let links = vec![
            Hyperlink::new("First", "a.pdf"),
            Hyperlink::new("Second", "b.pdf"),
            Hyperlink::new("Third", "a.pdf"),
        ];
        let resolution = resolve(&links, &options.source_dir);
        let numbering = Numbering::assign(resolution.found());
        let path = write(&options, &links, &resolution, &numbering).unwrap();

        let sheet = read_entry(&path, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row").count(), links.len() + 1);

        let strings = read_entry(&path, "xl/sharedStrings.xml");
        assert!(strings.contains("Found"));
        assert!(strings.contains("Missing"));
        // The duplicate rows share one number; a second serial was never
        // assigned.
        assert!(strings.contains("Document No. 001"));
        assert!(!strings.contains("Document No. 002"));
    }

    #[test]
    fn found_rows_link_to_the_renamed_destination_file() {
        let tmp = tempdir().unwrap();
        let options = options(tmp.path());
        std::fs::write(options.source_dir.join("a.pdf"), b"pdf").unwrap();

        let links = vec![Hyperlink::new("First", "a.pdf")];
        let resolution = resolve(&links, &options.source_dir);
        let numbering = Numbering::assign(resolution.found());
        let path = write(&options, &links, &resolution, &numbering).unwrap();

        let rels = read_entry(&path, "xl/worksheets/_rels/sheet1.xml.rels");
        assert!(rels.contains("file:///"));
        assert!(rels.contains("Document%20No.%20001%20-%20a.pdf") || rels.contains("Document No. 001 - a.pdf"));
    }

    #[test]
    fn unrenamed_runs_link_to_the_original_basename() {
        let tmp = tempdir().unwrap();
        let mut options = options(tmp.path());
        options.rename = false;
        std::fs::write(options.source_dir.join("a.pdf"), b"pdf").unwrap();

        let links = vec![Hyperlink::new("First", "a.pdf")];
        let resolution = resolve(&links, &options.source_dir);
        let numbering = Numbering::assign(resolution.found());
        let path = write(&options, &links, &resolution, &numbering).unwrap();

        let rels = read_entry(&path, "xl/worksheets/_rels/sheet1.xml.rels");
        assert!(rels.contains("a.pdf"));
        assert!(!rels.contains("001%20-%20a.pdf"));
    }

    #[test]
    fn file_urls_are_slash_normalized() {
        assert_eq!(
            file_url(Path::new("/srv/out/a.pdf")),
            "file:///srv/out/a.pdf"
        );
    }
}
