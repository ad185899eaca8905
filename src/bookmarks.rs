//! Outline entries pointing at the per-exercise chart pages, built with `lopdf`.
//!
//! Every chart starts on a fresh page and fits on it, so the charts occupy the last pages of
//! the document in order. The outline is flat: one entry per exercise.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{ReportError, Result};

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

/// Adds a flat `/Outlines` tree with one entry per chart title.
///
/// `titles` are mapped onto the trailing `titles.len()` pages. An empty title list leaves the
/// document unchanged.
pub fn apply_chart_bookmarks(document: &mut Document, titles: &[String]) -> Result<()> {
    if titles.is_empty() {
        return Ok(());
    }

    let pages = document.get_pages();
    let mut entries = collect_outline_entries(document, titles, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, document, &mut entries);
    insert_outlines_root(outlines_id, document, &entries)
}

fn collect_outline_entries(
    document: &mut Document,
    titles: &[String],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>> {
    let page_count = pages.len();
    if titles.len() > page_count {
        return Err(ReportError::PostProcess(format!(
            "{} chart bookmarks requested but the document has only {} pages",
            titles.len(),
            page_count
        )));
    }

    let first_chart_page = page_count - titles.len() + 1;
    titles
        .iter()
        .enumerate()
        .map(|(offset, title)| {
            let page_number = (first_chart_page + offset) as u32;
            let page_ref = pages.get(&page_number).copied().ok_or_else(|| {
                ReportError::PostProcess(format!(
                    "bookmark '{title}' refers to missing page {page_number}"
                ))
            })?;

            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: title.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &mut [OutlineEntry],
) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        let title = Object::string_literal(entries[index].title.as_str());
        dictionary.set("Title", title);
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }

        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<()> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ReportError::PostProcess("PDF catalog entry is missing".into()))?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .and_then(|object| object.as_dict_mut().ok())
        .ok_or_else(|| ReportError::PostProcess("PDF catalog entry is not a dictionary".into()))?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}
