//! System font discovery and text shaping for cover pages.
//!
//! Shaping is an optional capability: when no suitable face is installed the
//! cover generator falls through to the base-14 tiers, and no error reaches
//! the caller.

use std::sync::Arc;

use tracing::debug;

/// TrueType sfnt magic for plain outline fonts.
///
/// Collections (`ttcf`) and CFF-flavoured OpenType (`OTTO`) are rejected:
/// embedding either as a PDF `FontFile2` stream yields an invalid font
/// program.
const TRUETYPE_MAGIC: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// A single positioned glyph: id plus advance in 1000-per-em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Glyph id within the face.
    pub id: u16,
    /// Horizontal advance, scaled to 1000 units per em.
    pub advance: f32,
}

/// Face-wide metrics scaled to 1000 units per em, the scale PDF font
/// descriptors expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Typographic ascent.
    pub ascent: f32,
    /// Typographic descent (negative).
    pub descent: f32,
    /// Capital height; falls back to the ascent when the face omits it.
    pub cap_height: f32,
    /// Font bounding box as `[x_min, y_min, x_max, y_max]`.
    pub bbox: [f32; 4],
}

/// A TrueType face eligible for embedding, together with its raw font
/// program.
#[derive(Debug, Clone)]
pub struct EmbeddableFont {
    data: Arc<Vec<u8>>,
    index: u32,
    post_script_name: String,
}

impl EmbeddableFont {
    /// Wraps raw TrueType data, rejecting anything that is not a plain sfnt
    /// outline font or that `rustybuzz` cannot parse.
    #[must_use]
    pub fn from_data(data: Vec<u8>, index: u32, post_script_name: String) -> Option<Self> {
        if data.len() < 4 || data[..4] != TRUETYPE_MAGIC {
            return None;
        }
        let font = Self {
            data: Arc::new(data),
            index,
            post_script_name,
        };
        font.with_face(|_| ()).map(|()| font)
    }

    /// The face's PostScript name, used as the PDF `BaseFont`.
    #[must_use]
    pub fn post_script_name(&self) -> &str {
        &self.post_script_name
    }

    /// The raw font program bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn with_face<T>(&self, apply: impl FnOnce(&rustybuzz::Face<'_>) -> T) -> Option<T> {
        rustybuzz::Face::from_slice(&self.data, self.index).map(|face| apply(&face))
    }

    /// Whether the face has a glyph for every non-whitespace character of
    /// `text`.
    #[must_use]
    pub fn covers(&self, text: &str) -> bool {
        self.with_face(|face| {
            text.chars()
                .filter(|c| !c.is_whitespace())
                .all(|c| face.glyph_index(c).is_some())
        })
        .unwrap_or(false)
    }

    /// Face-wide metrics for the PDF font descriptor.
    #[must_use]
    pub fn metrics(&self) -> Option<FontMetrics> {
        self.with_face(|face| {
            let scale = 1000.0 / f32::from(face.as_ref().units_per_em());
            let ascent = f32::from(face.ascender()) * scale;
            let bbox = face.global_bounding_box();
            FontMetrics {
                ascent,
                descent: f32::from(face.descender()) * scale,
                cap_height: face
                    .capital_height()
                    .map_or(ascent, |height| f32::from(height) * scale),
                bbox: [
                    f32::from(bbox.x_min) * scale,
                    f32::from(bbox.y_min) * scale,
                    f32::from(bbox.x_max) * scale,
                    f32::from(bbox.y_max) * scale,
                ],
            }
        })
    }

    /// Shapes `text` in the given direction, returning glyphs in visual
    /// (left-to-right) order with advances in 1000-per-em units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn shape(&self, text: &str, right_to_left: bool) -> Option<Vec<Glyph>> {
        self.with_face(|face| {
            let mut buffer = rustybuzz::UnicodeBuffer::new();
            buffer.push_str(text);
            buffer.set_direction(if right_to_left {
                rustybuzz::Direction::RightToLeft
            } else {
                rustybuzz::Direction::LeftToRight
            });
            buffer.guess_segment_properties();
            let shaped = rustybuzz::shape(face, &[], buffer);
            let scale = 1000.0 / f32::from(face.as_ref().units_per_em());
            shaped
                .glyph_infos()
                .iter()
                .zip(shaped.glyph_positions())
                .map(|(info, position)| Glyph {
                    id: u16::try_from(info.glyph_id).unwrap_or(0),
                    advance: position.x_advance as f32 * scale,
                })
                .collect()
        })
    }
}

/// A database of installed fonts, probed for faces that can render the
/// localized cover label.
pub struct FontCatalog {
    db: fontdb::Database,
}

impl FontCatalog {
    /// Loads the system font database. Best effort: an empty database just
    /// means every cover uses the base-14 fallback tiers.
    #[must_use]
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!("loaded {} system font faces", db.len());
        Self { db }
    }

    /// An empty catalog; every lookup falls through to the fallback tiers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Finds the first embeddable TrueType face covering every character of
    /// `text`.
    #[must_use]
    pub fn face_covering(&self, text: &str) -> Option<EmbeddableFont> {
        for info in self.db.faces() {
            let Some(font) = load_face(info) else {
                continue;
            };
            if font.covers(text) {
                debug!("using face '{}' for cover text", font.post_script_name());
                return Some(font);
            }
        }
        debug!("no installed face covers the cover label");
        None
    }
}

fn load_face(info: &fontdb::FaceInfo) -> Option<EmbeddableFont> {
    let data = match &info.source {
        fontdb::Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        fontdb::Source::File(path) => std::fs::read(path).ok()?,
        fontdb::Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    EmbeddableFont::from_data(data, info.index, info.post_script_name.clone())
}
