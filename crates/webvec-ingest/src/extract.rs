//! Content extractors: fetched bytes in, one normalized text blob out.
//!
//! Extraction never fails a run. Unreadable content degrades to an empty
//! outcome with warnings attached; the pipeline drops such documents with
//! zero chunks.

use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::debug;

use webvec_core::ContentType;

/// Elements whose text is never visible content.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "meta", "link", "noscript"];

/// Extracted text plus anything the extractor wants observed without
/// aborting: empty PDF pages, fallback use, decode problems.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub text: String,
    pub warnings: Vec<String>,
}

impl ExtractionOutcome {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Converts one content type into normalized text.
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn content_type(&self) -> ContentType;

    fn extract(&self, content: &[u8]) -> ExtractionOutcome;
}

/// Collapses every whitespace run to a single space and trims the ends.
/// Applied uniformly to HTML and plain text so downstream chunking sees the
/// same shape regardless of origin.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_whitespace = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_whitespace {
                out.push(' ');
                prev_whitespace = true;
            }
        } else {
            out.push(c);
            prev_whitespace = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Strips script/style/meta/link elements and collects visible text.
#[derive(Debug, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    fn visible_text(element: ElementRef<'_>, out: &mut String) {
        if SKIPPED_TAGS.contains(&element.value().name()) {
            return;
        }
        for child in element.children() {
            if let Some(el) = ElementRef::wrap(child) {
                Self::visible_text(el, out);
            } else if let Some(text) = child.value().as_text() {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
}

impl TextExtractor for HtmlExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    fn extract(&self, content: &[u8]) -> ExtractionOutcome {
        let html = String::from_utf8_lossy(content);
        let document = Html::parse_document(&html);
        let mut text = String::new();
        Self::visible_text(document.root_element(), &mut text);
        ExtractionOutcome::new(normalize_whitespace(&text))
    }
}

/// Passes plain text through, normalized the same way as HTML output.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    fn extract(&self, content: &[u8]) -> ExtractionOutcome {
        let text = String::from_utf8_lossy(content);
        ExtractionOutcome::new(normalize_whitespace(&text))
    }
}

/// Two-tier PDF extraction: page-by-page via `lopdf` first, whole-document
/// via `pdf-extract` if the primary parse fails outright. A page yielding no
/// text is not an error; it is counted as a warning since it usually means a
/// scanned image. If both tiers fail the outcome is empty and the document
/// drops out of the pipeline.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    fn extract_pages(&self, content: &[u8]) -> Result<ExtractionOutcome, String> {
        let doc = lopdf::Document::load_mem(content).map_err(|e| e.to_string())?;
        if doc.is_encrypted() {
            return Err("document is encrypted".to_string());
        }

        let mut text = String::new();
        let mut empty_pages = 0usize;
        let page_count = doc.get_pages().len();
        for (page_number, _) in doc.get_pages() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) if !page_text.trim().is_empty() => {
                    text.push_str(page_text.trim_end());
                    text.push('\n');
                }
                _ => empty_pages += 1,
            }
        }

        let mut outcome = ExtractionOutcome::new(text.trim().to_string());
        if empty_pages > 0 {
            outcome = outcome.with_warning(format!(
                "{empty_pages} of {page_count} pages yielded no text (possibly scanned images)"
            ));
        }
        Ok(outcome)
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Pdf
    }

    fn extract(&self, content: &[u8]) -> ExtractionOutcome {
        match self.extract_pages(content) {
            Ok(outcome) => outcome,
            Err(primary_reason) => {
                debug!(reason = %primary_reason, "primary pdf extraction failed, trying fallback");
                match pdf_extract::extract_text_from_mem(content) {
                    Ok(text) => ExtractionOutcome::new(normalize_whitespace(&text)).with_warning(
                        format!("primary pdf extraction failed ({primary_reason}); used fallback"),
                    ),
                    Err(fallback_reason) => ExtractionOutcome::default().with_warning(format!(
                        "pdf extraction failed: primary ({primary_reason}), \
                         fallback ({fallback_reason})"
                    )),
                }
            }
        }
    }
}

/// Dispatches fetched content to the right extractor.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn TextExtractor>>,
    fallback: Arc<dyn TextExtractor>,
}

impl ExtractorRegistry {
    pub fn with_defaults() -> Self {
        Self {
            extractors: vec![
                Arc::new(HtmlExtractor),
                Arc::new(PdfExtractor),
                Arc::new(PlainTextExtractor),
            ],
            fallback: Arc::new(PlainTextExtractor),
        }
    }

    pub fn get(&self, content_type: ContentType) -> Arc<dyn TextExtractor> {
        self.extractors
            .iter()
            .find(|e| e.content_type() == content_type)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
