use std::{collections::HashMap, fmt, num::NonZeroUsize};

use super::hyperlink::Hyperlink;

/// The stable serial assigned to a distinct basename, in first-encounter
/// order among the resolved links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct DocumentNumber(NonZeroUsize);

impl DocumentNumber {
    /// The raw serial value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Renders the serial zero-padded to three digits.
    #[must_use]
    pub fn padded(self) -> String {
        format!("{self}")
    }

    /// Renders the full label, e.g. `"المستند رقم 007"`.
    #[must_use]
    pub fn labelled(self, label: &str) -> String {
        format!("{label} {self}")
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// First-encounter-order numbering of the distinct basenames among resolved
/// links.
///
/// Two links with identical basenames always share a number; two distinct
/// basenames never do. The assignment depends only on the order and contents
/// of the input sequence, so it is computed once per run and handed by
/// reference to every consumer that must agree on it (the transform stage
/// and the report writer).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Numbering {
    by_basename: HashMap<String, DocumentNumber>,
}

impl Numbering {
    /// Assigns serials to the basenames of `found`, starting at 1, in the
    /// order basenames are first seen.
    #[must_use]
    pub fn assign(found: &[Hyperlink]) -> Self {
        let mut by_basename = HashMap::new();
        for link in found {
            let basename = link.basename();
            if !by_basename.contains_key(basename) {
                let serial = NonZeroUsize::MIN.saturating_add(by_basename.len());
                by_basename.insert(basename.to_string(), DocumentNumber(serial));
            }
        }
        Self { by_basename }
    }

    /// Looks up the serial assigned to a basename.
    #[must_use]
    pub fn get(&self, basename: &str) -> Option<DocumentNumber> {
        self.by_basename.get(basename).copied()
    }

    /// The number of distinct basenames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_basename.len()
    }

    /// Whether no basenames have been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_basename.is_empty()
    }

    /// The filename an item is written under in the destination directory:
    /// `"{label} {NNN} - {basename}"` when renaming is enabled and the
    /// basename has a number, the basename unchanged otherwise.
    #[must_use]
    pub fn destination_filename(&self, basename: &str, label: &str, rename: bool) -> String {
        match (rename, self.get(basename)) {
            (true, Some(number)) => format!("{} - {basename}", number.labelled(label)),
            _ => basename.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(targets: &[&str]) -> Vec<Hyperlink> {
        targets
            .iter()
            .map(|target| Hyperlink::new("link", *target))
            .collect()
    }

    #[test]
    fn serials_follow_first_encounter_order() {
        let numbering = Numbering::assign(&links(&["b.pdf", "a.pdf", "c.pdf"]));
        assert_eq!(numbering.get("b.pdf").unwrap().get(), 1);
        assert_eq!(numbering.get("a.pdf").unwrap().get(), 2);
        assert_eq!(numbering.get("c.pdf").unwrap().get(), 3);
    }

    #[test]
    fn duplicate_basenames_share_a_serial() {
        let numbering = Numbering::assign(&links(&["a.pdf", "b.pdf", "a.pdf"]));
        assert_eq!(numbering.len(), 2);
        assert_eq!(numbering.get("a.pdf").unwrap().get(), 1);
        assert_eq!(numbering.get("b.pdf").unwrap().get(), 2);
    }

    #[test]
    fn assignment_is_deterministic() {
        let sequence = links(&["x.pdf", "y.pdf", "x.pdf", "z.pdf"]);
        let copy = sequence.clone();
        assert_eq!(Numbering::assign(&sequence), Numbering::assign(&copy));
    }

    #[test]
    fn labels_are_zero_padded() {
        let numbering = Numbering::assign(&links(&["a.pdf"]));
        let number = numbering.get("a.pdf").unwrap();
        assert_eq!(number.padded(), "001");
        assert_eq!(number.labelled("Document No."), "Document No. 001");
    }

    #[test]
    fn destination_filename_respects_rename_toggle() {
        let numbering = Numbering::assign(&links(&["a.pdf"]));
        assert_eq!(
            numbering.destination_filename("a.pdf", "Doc", true),
            "Doc 001 - a.pdf"
        );
        assert_eq!(numbering.destination_filename("a.pdf", "Doc", false), "a.pdf");
        assert_eq!(
            numbering.destination_filename("unknown.pdf", "Doc", true),
            "unknown.pdf"
        );
    }
}
