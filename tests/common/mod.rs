#![allow(dead_code)]

use anyhow::Result;
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_tools::engine::{ConvertIn, ConvertOut, Converter};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Writes an N-page PDF whose page `n` draws the text `Page-n`.
pub fn write_test_pdf(path: &Path, num_pages: u32) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for page_num in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 50 700 Td (Page-{page_num}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        page_ids.push(Object::Reference(doc.add_object(page)));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(page_ids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path).expect("save test PDF");
}

/// Text markers (`Page-n`) of every page in `path`, in page order.
pub fn page_markers(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("load PDF");
    doc.get_pages()
        .values()
        .map(|id| {
            let content = doc.get_page_content(*id).expect("page content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(Page-").expect("page marker") + 1;
            let end = start + text[start..].find(')').expect("marker end");
            text[start..end].to_string()
        })
        .collect()
}

/// Converter stand-in that counts calls and optionally writes the output.
pub struct FakeConverter {
    pub calls: Rc<Cell<u32>>,
    pub reply: ConvertOut,
    pub write_output: bool,
}

impl FakeConverter {
    pub fn succeeding(calls: &Rc<Cell<u32>>) -> Self {
        Self {
            calls: Rc::clone(calls),
            reply: ConvertOut::success(),
            write_output: true,
        }
    }

    pub fn failing(calls: &Rc<Cell<u32>>, message: &str) -> Self {
        Self {
            calls: Rc::clone(calls),
            reply: ConvertOut::failure(message),
            write_output: false,
        }
    }
}

impl Converter for FakeConverter {
    fn convert(&self, req: &ConvertIn) -> Result<ConvertOut> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(req.start, 0);
        assert_eq!(req.end, None);
        if self.write_output {
            std::fs::write(&req.output_docx, b"PK fake docx")?;
        }
        Ok(self.reply.clone())
    }
}
