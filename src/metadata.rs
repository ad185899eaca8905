//! Document information entries that `genpdf` does not expose.

use lopdf::{Dictionary, Document, Object};

use crate::error::Result;

/// Values written into the PDF `/Info` dictionary.
///
/// The title is set through `genpdf` when the document is built; author and creator are patched
/// in afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    pub creator: Option<String>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "Exercise Data".to_string(),
            author: Some("Fitness Tracker App".to_string()),
            creator: Some("Fitness Tracker Development Team".to_string()),
        }
    }
}

/// Sets `/Author` and `/Creator` on the trailer's info dictionary, creating it if needed.
pub fn apply_document_info(document: &mut Document, info: &DocumentInfo) -> Result<()> {
    let entries: Vec<(&str, &str)> = [("Author", &info.author), ("Creator", &info.creator)]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
        .collect();

    if entries.is_empty() {
        return Ok(());
    }

    let existing = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok();

    let info_id = match existing {
        Some(id) => id,
        None => {
            let id = document.add_object(Dictionary::new());
            document.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    let dictionary = document.get_object_mut(info_id)?.as_dict_mut()?;
    for (key, value) in entries {
        dictionary.set(key, Object::string_literal(value));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_string(document: &Document, key: &[u8]) -> Option<String> {
        let id = document.trailer.get(b"Info").ok()?.as_reference().ok()?;
        let dictionary = document.get_object(id).ok()?.as_dict().ok()?;
        let bytes = dictionary.get(key).ok()?.as_str().ok()?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    #[test]
    fn creates_info_dictionary_when_missing() {
        let mut document = Document::with_version("1.5");
        apply_document_info(&mut document, &DocumentInfo::default()).unwrap();

        assert_eq!(
            info_string(&document, b"Author").as_deref(),
            Some("Fitness Tracker App")
        );
        assert_eq!(
            info_string(&document, b"Creator").as_deref(),
            Some("Fitness Tracker Development Team")
        );
    }

    #[test]
    fn overwrites_existing_entries() {
        let mut document = Document::with_version("1.5");
        let mut existing = Dictionary::new();
        existing.set("Creator", Object::string_literal("printpdf"));
        existing.set("Title", Object::string_literal("Exercise Data"));
        let id = document.add_object(existing);
        document.trailer.set("Info", Object::Reference(id));

        apply_document_info(&mut document, &DocumentInfo::default()).unwrap();

        assert_eq!(
            info_string(&document, b"Creator").as_deref(),
            Some("Fitness Tracker Development Team")
        );
        assert_eq!(
            info_string(&document, b"Title").as_deref(),
            Some("Exercise Data")
        );
    }

    #[test]
    fn no_entries_leaves_document_untouched() {
        let mut document = Document::with_version("1.5");
        let info = DocumentInfo {
            author: None,
            creator: None,
            ..DocumentInfo::default()
        };
        apply_document_info(&mut document, &info).unwrap();
        assert!(document.trailer.get(b"Info").is_err());
    }
}
