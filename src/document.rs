//! Page-level PDF operations on top of `lopdf`.
//!
//! Extraction builds each output by whitelist: the selected page objects
//! plus everything reachable from them, under a fresh page tree and catalog.
//! Other pages and the source page tree are never copied, so the cost of an
//! output follows the pages it holds rather than the size of the source.

use crate::{page_range::PageRange, util::sha256_hex};
use anyhow::{Context, Result, bail};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Page attributes a page may take from an ancestor `Pages` node.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on `Parent` chain walks; page trees deeper than this are malformed.
const MAX_TREE_DEPTH: usize = 64;

pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).with_context(|| format!("open PDF: {}", path.display()))?;
        let pages = doc.get_pages();
        Ok(Self {
            path: path.to_path_buf(),
            doc,
            pages,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Builds a standalone document holding only `range` and serializes it.
    pub fn extract(&self, range: PageRange, compress: bool) -> Result<Vec<u8>> {
        let total = self.page_count();
        if range.start_page == 0 || range.start_page > range.end_page || range.end_page > total {
            bail!(
                "page range {} is outside the document ({} pages)",
                range,
                total
            );
        }

        let selected: Vec<ObjectId> = (range.start_page..=range.end_page)
            .filter_map(|n| self.pages.get(&n).copied())
            .collect();

        let pages_id = (self.doc.max_id + 1, 0);
        let catalog_id = (self.doc.max_id + 2, 0);

        let mut out = Document::with_version(self.doc.version.clone());
        let mut seen: BTreeSet<ObjectId> = selected.iter().copied().collect();
        let mut stack = Vec::new();

        for &id in &selected {
            let page = self.standalone_page(id, pages_id)?;
            collect_refs(&Object::Dictionary(page.clone()), &mut stack);
            out.objects.insert(id, Object::Dictionary(page));
        }

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            // Dangling references stay dangling; readers treat them as null.
            let Ok(obj) = self.doc.get_object(id) else {
                continue;
            };
            if is_page_tree_node(obj) {
                continue;
            }
            collect_refs(obj, &mut stack);
            out.objects.insert(id, obj.clone());
        }

        out.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Count", Object::Integer(selected.len() as i64)),
                (
                    "Kids",
                    Object::Array(selected.iter().map(|id| Object::Reference(*id)).collect()),
                ),
            ])),
        );
        out.objects.insert(
            catalog_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Catalog".to_vec())),
                ("Pages", Object::Reference(pages_id)),
            ])),
        );
        out.trailer.set("Root", Object::Reference(catalog_id));
        out.max_id = catalog_id.0;

        if compress {
            out.compress();
        }

        let mut buffer = Vec::new();
        out.save_to(&mut buffer)
            .with_context(|| format!("serialize pages {range}"))?;
        Ok(buffer)
    }

    /// Extracts `range` into `dest`, replacing any existing file.
    pub fn write_range(&self, range: PageRange, dest: &Path, compress: bool) -> Result<()> {
        let bytes = self.extract(range, compress)?;
        std::fs::write(dest, &bytes).with_context(|| format!("write {}", dest.display()))?;
        debug!(
            pages = %range,
            bytes = bytes.len(),
            sha256 = %sha256_hex(&bytes),
            "wrote {}",
            dest.display()
        );
        Ok(())
    }

    /// The page dictionary with inherited attributes copied in and `Parent`
    /// pointing at `parent`.
    fn standalone_page(&self, id: ObjectId, parent: ObjectId) -> Result<Dictionary> {
        let mut page = self
            .doc
            .get_dictionary(id)
            .with_context(|| format!("page object {} {}", id.0, id.1))?
            .clone();
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = self.inherited(&page, key) {
                    page.set(key, value);
                }
            }
        }
        page.set("Parent", Object::Reference(parent));
        Ok(page)
    }

    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let node = self.doc.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }
}

/// Opens `path` only long enough to count its pages.
pub fn page_count(path: &Path) -> Result<u32> {
    Ok(PdfDocument::open(path)?.page_count())
}

fn collect_refs(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|o| collect_refs(o, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, o)| collect_refs(o, out)),
        Object::Stream(stream) => stream.dict.iter().for_each(|(_, o)| collect_refs(o, out)),
        _ => {}
    }
}

/// `Page` and `Pages` dictionaries reached from a selected page (through
/// `Parent` or an annotation's `/P`) belong to the source tree, not the output.
fn is_page_tree_node(obj: &Object) -> bool {
    let Object::Dictionary(dict) = obj else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    /// Three pages whose `MediaBox` and `Resources` live only on the root
    /// `Pages` node.
    fn write_inherited_tree(path: &Path) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));

        let mut kids = Vec::new();
        for n in 1..=3 {
            let content = format!("BT /F1 12 Tf 50 700 Td (Page-{n}) Tj ET");
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let fonts = Dictionary::from_iter(vec![("F1", Object::Reference(font_id))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(3)),
            ("Kids", Object::Array(kids)),
            ("Resources", Object::Dictionary(resources)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Integer(400),
                ]),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.save(path).unwrap();
    }

    #[test]
    fn extracted_page_keeps_inherited_attributes() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tree.pdf");
        write_inherited_tree(&src);

        let bytes = PdfDocument::open(&src)
            .unwrap()
            .extract(PageRange::single(2), false)
            .unwrap();
        let out = Document::load_mem(&bytes).unwrap();
        let pages = out.get_pages();
        assert_eq!(pages.len(), 1);

        let page = out.get_dictionary(pages[&1]).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[3].as_i64().unwrap(), 400);

        let font_ref = page
            .get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|resources| resources.get(b"Font"))
            .and_then(Object::as_dict)
            .and_then(|fonts| fonts.get(b"F1"))
            .and_then(Object::as_reference)
            .unwrap();
        let font = out.get_dictionary(font_ref).unwrap();
        assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    }

    #[test]
    fn extracted_page_carries_no_other_page_content() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tree.pdf");
        write_inherited_tree(&src);

        let bytes = PdfDocument::open(&src)
            .unwrap()
            .extract(PageRange::single(2), false)
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Page-2)"));
        assert!(!text.contains("(Page-1)"));
        assert!(!text.contains("(Page-3)"));
    }

    #[test]
    fn out_of_range_extraction_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tree.pdf");
        write_inherited_tree(&src);

        let doc = PdfDocument::open(&src).unwrap();
        let err = doc
            .extract(
                PageRange {
                    start_page: 2,
                    end_page: 4,
                },
                false,
            )
            .unwrap_err();
        assert!(err.to_string().contains("outside the document"));
    }
}
