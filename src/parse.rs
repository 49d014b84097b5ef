//! Loading and field extraction for the Alma resource-sharing export.
//!
//! An export document contains zero or more `rsExport` elements, one per
//! request. Element matching is by local name, so namespace-prefixed feeds
//! (`<xb:rsExport>`) and plain ones parse identically. A field that is
//! absent in the source yields an empty string: absence is a valid terminal
//! state for every field, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::debug;

/// Element name wrapping one exported request.
pub const RECORD_TAG: &str = "rsExport";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read export file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed export document: {0}")]
    MalformedInput(#[from] roxmltree::Error),
}

/// The field vocabulary of one request record, extracted as plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields {
    pub item_id: String,
    pub title: String,
    pub barcode: String,
    pub patron_name: String,
    pub patron_barcode: String,
    pub request_note: String,
    pub comment: String,
    pub volume: String,
    pub pickup_library: String,
    pub library_code: String,
}

/// Reads the whole export file as UTF-8 text.
pub fn load_file(path: &Path) -> Result<String, ParseError> {
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded export file");
    Ok(text)
}

/// Parses the export text into a document. The document borrows `text`, so
/// it lives on the caller's stack for the duration of one batch.
pub fn parse_document(text: &str) -> Result<Document<'_>, ParseError> {
    let document = Document::parse(text)?;
    Ok(document)
}

/// All request records in the document, in document order.
pub fn record_nodes<'a, 'input>(document: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    let records: Vec<Node> = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == RECORD_TAG)
        .collect();
    debug!(count = records.len(), "Selected request records");
    records
}

/// Text content of the first descendant element named `tag` under `record`,
/// or the empty string when no such element exists. Concatenates every text
/// node below the match, so nested markup inside a field still yields its
/// full text. Tag names are case-sensitive.
pub fn element_text(record: Node<'_, '_>, tag: &str) -> String {
    let found = record
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == tag);
    let element = match found {
        Some(element) => element,
        None => return String::new(),
    };
    let mut text = String::new();
    for node in element.descendants().filter(|node| node.is_text()) {
        if let Some(part) = node.text() {
            text.push_str(part);
        }
    }
    text
}

/// Extracts the full field vocabulary from one record.
pub fn extract_fields(record: Node<'_, '_>) -> RequestFields {
    RequestFields {
        item_id: element_text(record, "itemId"),
        title: element_text(record, "title"),
        barcode: element_text(record, "barcode"),
        patron_name: element_text(record, "patronName"),
        patron_barcode: element_text(record, "patronIdentifier"),
        request_note: element_text(record, "requestNote"),
        comment: element_text(record, "comment"),
        volume: element_text(record, "volume"),
        pickup_library: element_text(record, "library"),
        library_code: element_text(record, "libraryCode"),
    }
}
