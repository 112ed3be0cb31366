//! In-memory PDF builders for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Builds a small, valid PDF with one text line per page.
#[derive(Default)]
pub struct PdfFixture {
    pages: Vec<String>,
    info: Vec<(String, Object)>,
    xmp: Option<String>,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page whose only content is `text`.
    pub fn page(mut self, text: &str) -> Self {
        self.pages.push(text.to_string());
        self
    }

    /// Add a string entry to the `/Info` dictionary.
    pub fn info(self, key: &str, value: &str) -> Self {
        self.info_object(key, Object::string_literal(value))
    }

    /// Add an arbitrary object to the `/Info` dictionary.
    pub fn info_object(mut self, key: &str, value: Object) -> Self {
        self.info.push((key.to_string(), value));
        self
    }

    /// Attach an XMP packet to the catalog.
    pub fn xmp(mut self, xml: &str) -> Self {
        self.xmp = Some(xml.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for text in &self.pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                    Operation::new("ET", vec![]),
                ],
            };
            let encoded = content.encode().expect("encode page content");
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(xml) = self.xmp {
            let xmp_id = doc.add_object(Stream::new(
                dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
                xml.into_bytes(),
            ));
            catalog.set("Metadata", xmp_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in self.info {
                info.set(key, value);
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("serialize fixture PDF");
        buffer
    }
}
