//! Assembly and serialization of GFA inventory-control records.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;

use crate::parse::RequestFields;
use crate::transform::{self, DeliveryCode, RequestClass, TransformError};

/// Note value the downstream system requires when no note content exists.
/// GFA silently halts on an empty note field, so the sentinel is mandatory.
pub const NO_NOTE: &str = "no_note";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing required field `{0}`")]
    MissingRequiredField(&'static str),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// One normalized entry for the GFA system. Every field is always
/// populated; missing source data becomes an empty string or a sentinel,
/// never an omission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfaRecord {
    pub item_id: String,
    pub item_barcode: String,
    pub delivery: String,
    pub location: String,
    pub patron_name: String,
    pub patron_barcode: String,
    pub title: String,
    pub date: String,
    pub note: String,
}

impl GfaRecord {
    /// The fields in the order the downstream contract fixes.
    pub fn as_fields(&self) -> [&str; 9] {
        [
            self.item_id.as_str(),
            self.item_barcode.as_str(),
            self.delivery.as_str(),
            self.location.as_str(),
            self.patron_name.as_str(),
            self.patron_barcode.as_str(),
            self.title.as_str(),
            self.date.as_str(),
            self.note.as_str(),
        ]
    }

    /// One data-file line: every field double-quoted, comma-separated,
    /// newline-terminated. No header, no escaping beyond the wrapping
    /// quotes.
    pub fn to_quoted_line(&self) -> String {
        let quoted: Vec<String> = self
            .as_fields()
            .iter()
            .map(|field| format!("\"{}\"", field))
            .collect();
        format!("{}\n", quoted.join(","))
    }
}

/// Serializes a whole batch in data-file form.
pub fn stringify_batch(records: &[GfaRecord]) -> String {
    records.iter().map(GfaRecord::to_quoted_line).collect()
}

/// Renders the GFA creation date, e.g. `Tue Feb 02 1960`. Day and month
/// names are plain English regardless of locale.
pub fn gfa_date(now: NaiveDateTime) -> String {
    now.format("%a %b %d %Y").to_string()
}

fn control_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x00-\x1f\x7f]+").unwrap())
}

/// Builds the single note field from the three optional note sources:
/// `requestNote`, `comment`, `volume`, in that order, joined by single
/// spaces. The feed sometimes embeds newlines in note text and GFA halts on
/// them, so every control-character run collapses to one space. An empty
/// result becomes the [`NO_NOTE`] sentinel.
pub fn assemble_note(fields: &RequestFields) -> String {
    let parts: Vec<String> = [
        fields.request_note.as_str(),
        fields.comment.as_str(),
        fields.volume.as_str(),
    ]
    .iter()
    .map(|raw| control_runs().replace_all(raw, " ").trim().to_string())
    .filter(|part| !part.is_empty())
    .collect();
    if parts.is_empty() {
        NO_NOTE.to_string()
    } else {
        parts.join(" ")
    }
}

/// Builds one GFA record. The delivery mapping runs first and its failure
/// short-circuits before any location derivation. `itemId` is the one
/// required field; everything else tolerates emptiness.
pub fn build_record(
    fields: &RequestFields,
    class: RequestClass,
    now: NaiveDateTime,
) -> Result<GfaRecord, BuildError> {
    if fields.item_id.is_empty() {
        return Err(BuildError::MissingRequiredField("itemId"));
    }
    let pickup = class.effective_pickup(&fields.pickup_library);
    let delivery = transform::delivery_code(pickup)?;
    Ok(assemble_record(fields, delivery, now))
}

/// Assembly once the fulfillment channel is known. Infallible, so a caller
/// that resolved the channel some other way (the delivery lookup) can still
/// produce a record.
pub fn assemble_record(
    fields: &RequestFields,
    delivery: DeliveryCode,
    now: NaiveDateTime,
) -> GfaRecord {
    let location = transform::location_code(&fields.library_code, delivery);
    GfaRecord {
        item_id: fields.item_id.clone(),
        item_barcode: fields.barcode.clone(),
        delivery: delivery.as_str().to_string(),
        location: location.as_str().to_string(),
        patron_name: fields.patron_name.clone(),
        patron_barcode: fields.patron_barcode.clone(),
        title: fields.title.clone(),
        date: gfa_date(now),
        note: assemble_note(fields),
    }
}
