use lopdf::{Dictionary, Document, Object};

use pdfmeta_core::{
    BackendError, Metadata, MetadataSource, PdfBackend, PdfContent, XMP_METADATA_KEY,
};

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

/// lopdf-based implementation of [`PdfBackend`].
///
/// This crate is the only one that links the PDF library, so the rest of
/// the workspace only sees [`PdfContent`].
///
/// Metadata comes from the trailer's `/Info` dictionary (every key, in
/// dictionary order) and, unless disabled, the catalog's XMP packet stored
/// under [`XMP_METADATA_KEY`].
pub struct LopdfBackend {
    include_xmp: bool,
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self { include_xmp: true }
    }
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable reading the XMP metadata packet.
    pub fn with_xmp(mut self, include: bool) -> Self {
        self.include_xmp = include;
        self
    }
}

impl PdfBackend for LopdfBackend {
    fn extract(&self, data: &[u8]) -> Result<PdfContent, BackendError> {
        let document =
            Document::load_mem(data).map_err(|e| BackendError::Malformed(e.to_string()))?;

        let mut metadata = Metadata::new();
        let mut sources = Vec::new();

        if self.include_xmp
            && let Some(xml) = xmp_packet(&document)
        {
            metadata.insert(XMP_METADATA_KEY.to_string(), xml);
            sources.push(MetadataSource::Xmp);
        }

        if let Some(info) = info_dictionary(&document) {
            sources.push(MetadataSource::Info);
            for (key, value) in info.iter() {
                let key = String::from_utf8_lossy(key).into_owned();
                match object_to_string(&document, value, 0) {
                    Some(value) => {
                        metadata.insert(key, value);
                    }
                    None => tracing::debug!(key = %key, "skipping non-scalar Info entry"),
                }
            }
        }

        let pages = document.get_pages();
        let mut pages_text = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            match document.extract_text(&[page_number]) {
                Ok(text) => pages_text.push(text),
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "unreadable page content, leaving page blank");
                    pages_text.push(String::new());
                }
            }
        }

        Ok(PdfContent {
            metadata,
            sources,
            page_count: pages.len(),
            text: pages_text.join("\n"),
        })
    }
}

/// Follow a single indirect reference, if any.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    resolve(document, info)?.as_dict().ok()
}

fn xmp_packet(document: &Document) -> Option<String> {
    let root = document.trailer.get(b"Root").ok()?;
    let catalog = resolve(document, root)?.as_dict().ok()?;
    let metadata = catalog.get(b"Metadata").ok()?;
    let stream = resolve(document, metadata)?.as_stream().ok()?;
    // Uncompressed packets have no /Filter, which lopdf reports as an error.
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render an Info value as a string. Dictionaries and streams have no
/// sensible scalar form and yield `None`.
fn object_to_string(document: &Document, object: &Object, depth: u8) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Null => Some(String::new()),
        Object::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| object_to_string(document, item, depth + 1))
                .collect();
            Some(format!("[{}]", parts.join(", ")))
        }
        Object::Reference(id) if depth < 2 => {
            let target = document.get_object(*id).ok()?;
            object_to_string(document, target, depth + 1)
        }
        Object::Reference((num, generation)) => Some(format!("{} {} R", num, generation)),
        Object::Dictionary(_) | Object::Stream(_) => None,
    }
}

/// Decode a PDF text string: UTF-16 with BOM, UTF-8 (with or without BOM),
/// otherwise PDFDocEncoding.
pub fn decode_text_string(bytes: &[u8]) -> String {
    let decoded = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        decode_utf16(rest, u16::from_be_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        decode_utf16(rest, u16::from_le_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| pdf_doc_char(b)).collect(),
        }
    };
    decoded.trim_end_matches('\0').to_string()
}

/// PDFDocEncoding code points 0x80..=0xA0; the rest of the upper half
/// matches Latin-1.
const PDF_DOC_UPPER: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
    '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
    '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
    '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
    '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}', '\u{20AC}',
];

fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x80..=0xA0 => PDF_DOC_UPPER[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
