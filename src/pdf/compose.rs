//! Page-tree surgery: prepending cover pages onto existing documents.

use std::collections::HashMap;

use lopdf::{Document, Object, ObjectId};

/// Copies objects from one document into another, assigning fresh ids in the
/// target and remembering every translation so that shared and cyclic
/// references (page → parent → kids → page) are copied exactly once.
struct Importer<'a> {
    from: &'a Document,
    into: &'a mut Document,
    translated: HashMap<ObjectId, ObjectId>,
}

impl Importer<'_> {
    fn import(&mut self, id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(done) = self.translated.get(&id) {
            return Ok(*done);
        }
        // Reserve the target id before recursing so cycles terminate. The
        // placeholder is replaced once the object's references are rewritten.
        let reserved = self.into.add_object(Object::Null);
        self.translated.insert(id, reserved);
        let translated = self.translate(self.from.get_object(id)?.clone())?;
        if let Some(slot) = self.into.objects.get_mut(&reserved) {
            *slot = translated;
        }
        Ok(reserved)
    }

    fn translate(&mut self, object: Object) -> Result<Object, lopdf::Error> {
        Ok(match object {
            Object::Reference(id) => Object::Reference(self.import(id)?),
            Object::Array(items) => Object::Array(
                items
                    .into_iter()
                    .map(|item| self.translate(item))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Dictionary(mut dictionary) => {
                for (_, value) in dictionary.iter_mut() {
                    *value = self.translate(value.clone())?;
                }
                Object::Dictionary(dictionary)
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.translate(value.clone())?;
                }
                Object::Stream(stream)
            }
            primitive => primitive,
        })
    }
}

/// Prepends every page of `front` before the existing pages of `document`.
///
/// The pages of `front` keep their relative order, the existing pages keep
/// theirs, and every object the imported pages reference (content streams,
/// resources, fonts) is deep-copied under fresh ids.
///
/// # Errors
///
/// Returns [`lopdf::Error`] when either page tree cannot be traversed or the
/// target document lacks a root catalog.
pub fn prepend_pages(document: &mut Document, front: &Document) -> Result<(), lopdf::Error> {
    let mut front_pages: Vec<_> = front.get_pages().into_iter().collect();
    front_pages.sort_by_key(|(number, _)| *number);
    if front_pages.is_empty() {
        return Ok(());
    }

    let mut importer = Importer {
        from: front,
        into: document,
        translated: HashMap::new(),
    };
    let mut imported = Vec::with_capacity(front_pages.len());
    for (_, page_id) in front_pages {
        imported.push(importer.import(page_id)?);
    }

    let root_id = document.trailer.get(b"Root")?.as_reference()?;
    let pages_id = document
        .get_object(root_id)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()?;

    let pages = document.get_object_mut(pages_id)?.as_dict_mut()?;
    let mut kids: Vec<Object> = imported.iter().map(|id| Object::Reference(*id)).collect();
    kids.extend(pages.get(b"Kids")?.as_array()?.clone());
    let count = pages.get(b"Count")?.as_i64()?;
    pages.set("Kids", kids);
    pages.set("Count", count + i64::try_from(imported.len()).unwrap_or(i64::MAX));

    // Imported pages still point at the front document's page tree.
    for page_id in imported {
        if let Ok(Object::Dictionary(page)) = document.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use lopdf::{
        Stream, StringFormat,
        content::{Content, Operation},
        dictionary,
    };

    use super::*;

    /// Builds a minimal real document with `pages` pages, each showing
    /// `"{text_prefix} {page}"` in a base-14 font.
    pub(crate) fn sample_document(pages: u32, text_prefix: &str) -> Document {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = vec![];
        for page in 1..=pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{text_prefix} {page}").into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                document.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        document.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => i64::from(pages),
            }
            .into(),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        document
    }

    fn page_text(document: &Document, page: u32) -> String {
        let pages = document.get_pages();
        let content = document
            .get_page_content(*pages.get(&page).unwrap())
            .unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn prepended_pages_land_in_front_in_order() {
        let mut body = sample_document(2, "Body");
        let front = sample_document(1, "Cover");

        prepend_pages(&mut body, &front).unwrap();

        assert_eq!(body.get_pages().len(), 3);
        assert!(page_text(&body, 1).contains("Cover 1"));
        assert!(page_text(&body, 2).contains("Body 1"));
        assert!(page_text(&body, 3).contains("Body 2"));
    }

    #[test]
    fn prepending_an_empty_document_is_a_no_op() {
        let mut body = sample_document(2, "Body");
        let front = sample_document(0, "Cover");

        prepend_pages(&mut body, &front).unwrap();

        assert_eq!(body.get_pages().len(), 2);
    }

    #[test]
    fn shared_resources_are_copied_once() {
        let mut body = sample_document(1, "Body");
        let before = body.objects.len();
        let front = sample_document(2, "Cover");

        prepend_pages(&mut body, &front).unwrap();

        // Two pages share one font and one resource dictionary; the import
        // must not duplicate them per page.
        let imported = body.objects.len() - before;
        assert!(imported <= front.objects.len() + 2);
        assert!(body.get_pages().len() == 3);
    }
}
