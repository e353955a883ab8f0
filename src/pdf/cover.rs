//! Single-page numbered cover generation.
//!
//! The cover carries the localized label plus the zero-padded document
//! number, centered on an A4 page. Text rendering degrades through three
//! tiers rather than failing: an embedded shaped system font, the base-14
//! Times-Roman with the full label (Latin-1 labels only), and finally the
//! base-14 Helvetica-Bold with the bare number, which cannot fail.

use lopdf::{
    Document, Object, ObjectId, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};

use super::fonts::{EmbeddableFont, Glyph};
use crate::domain::DocumentNumber;

/// A4 page width in points.
const PAGE_WIDTH: f32 = 595.28;
/// A4 page height in points.
const PAGE_HEIGHT: f32 = 841.89;
/// Text size for the shaped and Times-Roman tiers.
const LABEL_SIZE: f32 = 24.0;
/// Text size for the bare-number tier.
const NUMBER_SIZE: f32 = 36.0;

/// Renders the one-page cover document for `number`.
///
/// `font` is the optional shaping capability resolved once per run; `None`
/// goes straight to the fallback tiers. Returns `None` only when every tier
/// fails, which the caller treats like any other per-item failure.
#[must_use]
pub fn render(label: &str, number: DocumentNumber, font: Option<&EmbeddableFont>) -> Option<Document> {
    if let Some(font) = font {
        if let Some(document) = render_shaped(label, number, font) {
            return Some(document);
        }
    }
    render_base14(&number.labelled(label), "Times-Roman", LABEL_SIZE)
        .or_else(|| render_base14(&number.padded(), "Helvetica-Bold", NUMBER_SIZE))
}

/// Embedded-font tier: shape the right-to-left label with the digits kept
/// left-to-right, embed the font program, and show glyphs by id.
fn render_shaped(label: &str, number: DocumentNumber, font: &EmbeddableFont) -> Option<Document> {
    let mut line: Vec<Glyph> = font.shape(&number.padded(), false)?;
    line.extend(font.shape(" ", false)?);
    line.extend(font.shape(label, true)?);

    let scale = LABEL_SIZE / 1000.0;
    let width: f32 = line.iter().map(|glyph| glyph.advance).sum::<f32>() * scale;
    let glyph_string: Vec<u8> = line
        .iter()
        .flat_map(|glyph| glyph.id.to_be_bytes())
        .collect();
    let operations = centered_text(
        LABEL_SIZE,
        width,
        Object::String(glyph_string, StringFormat::Hexadecimal),
    );

    let mut document = Document::with_version("1.7");
    let font_id = embed_type0(&mut document, font, &line)?;
    assemble_page(document, font_id, operations)
}

/// Base-14 tier: text shown with a standard font and `WinAnsiEncoding`.
/// Returns `None` when the text does not fit in Latin-1, so a non-Latin
/// label falls through to the bare-number tier.
fn render_base14(text: &str, base_font: &str, size: f32) -> Option<Document> {
    let encoded = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;

    // Approximate advance; good enough to center a short line.
    let width = 0.6 * size * char_count(text);
    let operations = centered_text(size, width, Object::String(encoded, StringFormat::Literal));

    let mut document = Document::with_version("1.7");
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    assemble_page(document, font_id, operations)
}

fn char_count(text: &str) -> f32 {
    let count = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    f32::from(count)
}

fn centered_text(size: f32, width: f32, text: Object) -> Vec<Operation> {
    let x = (PAGE_WIDTH - width) / 2.0;
    let y = PAGE_HEIGHT / 2.0;
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![text]),
        Operation::new("ET", vec![]),
    ]
}

/// Builds the `Type0`/`CIDFontType2` object graph for an embedded face,
/// with identity CID-to-glyph mapping and per-glyph widths for the glyphs
/// actually shown.
fn embed_type0(
    document: &mut Document,
    font: &EmbeddableFont,
    glyphs: &[Glyph],
) -> Option<ObjectId> {
    let metrics = font.metrics()?;
    let file_id = document.add_object(Stream::new(
        dictionary! { "Length1" => i64::try_from(font.data().len()).ok()? },
        font.data().to_vec(),
    ));
    let descriptor_id = document.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => font.post_script_name(),
        "Flags" => 4,
        "FontBBox" => vec![
            metrics.bbox[0].into(),
            metrics.bbox[1].into(),
            metrics.bbox[2].into(),
            metrics.bbox[3].into(),
        ],
        "ItalicAngle" => 0,
        "Ascent" => metrics.ascent,
        "Descent" => metrics.descent,
        "CapHeight" => metrics.cap_height,
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let mut widths: Vec<Object> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for glyph in glyphs {
        if seen.insert(glyph.id) {
            widths.push(i64::from(glyph.id).into());
            widths.push(Object::Array(vec![glyph.advance.into()]));
        }
    }

    let descendant_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => font.post_script_name(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => Object::Array(widths),
        "CIDToGIDMap" => "Identity",
    });
    Some(document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => font.post_script_name(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
    }))
}

/// Wraps the content stream and font into a complete one-page document.
fn assemble_page(
    mut document: Document,
    font_id: ObjectId,
    operations: Vec<Operation>,
) -> Option<Document> {
    let pages_id = document.new_object_id();
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let encoded = Content { operations }.encode().ok()?;
    let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    document.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }
        .into(),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    Some(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Hyperlink, Numbering, RunOptions};

    const LATIN_LABEL: &str = "Document No.";

    fn number() -> DocumentNumber {
        Numbering::assign(&[Hyperlink::new("x", "a.pdf")])
            .get("a.pdf")
            .expect("assigned number")
    }

    fn page_text(document: &Document) -> String {
        let pages = document.get_pages();
        let page_id = *pages.get(&1).expect("one page");
        let content = document.get_page_content(page_id).expect("page content");
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn cover_renders_without_a_shaping_font() {
        let document =
            render(RunOptions::DEFAULT_LABEL, number(), None).expect("fallback tiers");
        assert_eq!(document.get_pages().len(), 1);
    }

    #[test]
    fn latin_label_is_rendered_in_full_by_the_times_tier() {
        let document = render(LATIN_LABEL, number(), None).expect("latin label fits WinAnsi");
        assert!(page_text(&document).contains("Document No. 001"));
    }

    #[test]
    fn arabic_label_falls_through_to_the_number_tier() {
        assert!(render_base14(RunOptions::DEFAULT_LABEL, "Times-Roman", LABEL_SIZE).is_none());
        let document = render(RunOptions::DEFAULT_LABEL, number(), None).expect("number tier");
        assert!(page_text(&document).contains("001"));
    }
}
