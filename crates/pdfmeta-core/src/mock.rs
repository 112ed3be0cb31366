//! Mock PDF backend for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend, PdfContent};
use crate::{Metadata, MetadataSource};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a parsed document.
    Content(PdfContent),
    /// Simulate a document the library refuses to load.
    Malformed(String),
    /// Simulate a library bug that panics on this input.
    Panic,
}

impl MockResponse {
    /// A parsed document with Info metadata built from `pairs` and `text`.
    pub fn document(pairs: &[(&str, &str)], text: &str) -> Self {
        let metadata: Metadata = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let sources = if metadata.is_empty() {
            Vec::new()
        } else {
            vec![MetadataSource::Info]
        };
        MockResponse::Content(PdfContent {
            metadata,
            sources,
            page_count: 1,
            text: text.to_string(),
        })
    }
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Responses are keyed by the exact input bytes; anything unknown is
/// reported as malformed. Calls are counted.
#[derive(Default)]
pub struct MockBackend {
    responses: HashMap<Vec<u8>, MockResponse>,
    call_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response returned for `data`.
    pub fn with(mut self, data: impl Into<Vec<u8>>, response: MockResponse) -> Self {
        self.responses.insert(data.into(), response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl PdfBackend for MockBackend {
    fn extract(&self, data: &[u8]) -> Result<PdfContent, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(data) {
            Some(MockResponse::Content(content)) => Ok(content.clone()),
            Some(MockResponse::Malformed(msg)) => Err(BackendError::Malformed(msg.clone())),
            Some(MockResponse::Panic) => panic!("mock backend panic"),
            None => Err(BackendError::Malformed("unknown mock input".into())),
        }
    }
}
