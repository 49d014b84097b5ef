//! High-level pipeline: detect → claim → parse → build → archive → emit.
//!
//! [`process_export`] turns one export document into GFA records,
//! collecting per-record failures without aborting the batch. A bad record
//! is a per-record outcome; only a document that cannot be parsed at all is
//! an error here.
//!
//! [`run_once`] wires the batch step to the file lifecycle: it claims at
//! most one waiting arrival file, processes it to completion, writes every
//! artifact, and returns a [`RunReport`]. File-level failures are fatal for
//! the run and surface as errors to the caller.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::archive;
use crate::config::RunConfig;
use crate::gfa::{self, BuildError, GfaRecord};
use crate::lookup::DeliveryLookup;
use crate::parse::{self, ParseError};
use crate::transform::{Classifier, DeliveryCode, TransformError};

/// One record that could not be built, with its position in the source
/// document.
#[derive(Debug)]
pub struct RecordFailure {
    pub index: usize,
    pub error: BuildError,
}

/// Everything one batch produced: built records in source order, plus the
/// failures, also in source order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<GfaRecord>,
    pub failures: Vec<RecordFailure>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Summary of one completed pass, for the CLI and the logs.
#[derive(Debug)]
pub struct RunReport {
    pub arrival_file: String,
    pub datetime_stamp: String,
    pub built: usize,
    pub failed: usize,
    pub archived_original: PathBuf,
    pub gfa_data_file: PathBuf,
    pub gfa_count_file: PathBuf,
}

/// Parses the export text and builds one GFA record per request element.
///
/// A document with zero records is an empty outcome, not an error. When the
/// delivery mapping rejects a pickup value and a lookup collaborator is
/// configured, it is consulted once for that record: an answer from the
/// provisioned delivery set rescues the record, anything else keeps the
/// original error.
pub async fn process_export(
    text: &str,
    classifier: &dyn Classifier,
    lookup: Option<&dyn DeliveryLookup>,
    now: NaiveDateTime,
) -> Result<BatchOutcome, ParseError> {
    let document = parse::parse_document(text)?;
    let records = parse::record_nodes(&document);
    info!(count = records.len(), "Export parsed");

    let mut outcome = BatchOutcome::default();
    for (index, node) in records.into_iter().enumerate() {
        let fields = parse::extract_fields(node);
        let class = classifier.classify(&fields);
        match gfa::build_record(&fields, class, now) {
            Ok(record) => {
                debug!(index, item_id = %record.item_id, delivery = %record.delivery, "Record built");
                outcome.records.push(record);
            }
            Err(BuildError::Transform(TransformError::UnknownPickupLibrary(raw))) => {
                match consult_lookup(lookup, &raw).await {
                    Some(delivery) => {
                        info!(index, pickup = %raw, code = delivery.as_str(), "Delivery lookup rescued record");
                        outcome.records.push(gfa::assemble_record(&fields, delivery, now));
                    }
                    None => {
                        warn!(index, pickup = %raw, "Unknown pickup library, record not built");
                        outcome.failures.push(RecordFailure {
                            index,
                            error: BuildError::Transform(TransformError::UnknownPickupLibrary(raw)),
                        });
                    }
                }
            }
            Err(error) => {
                warn!(index, error = %error, "Record not built");
                outcome.failures.push(RecordFailure { index, error });
            }
        }
    }
    Ok(outcome)
}

async fn consult_lookup(lookup: Option<&dyn DeliveryLookup>, raw: &str) -> Option<DeliveryCode> {
    let lookup = lookup?;
    match lookup.delivery_code_for(raw).await {
        Ok(code) => match DeliveryCode::from_code(&code) {
            Some(delivery) => Some(delivery),
            None => {
                warn!(pickup = %raw, code = %code, "Delivery lookup answered with unprovisioned code");
                None
            }
        },
        Err(error) => {
            warn!(pickup = %raw, error = %error, "Delivery lookup failed");
            None
        }
    }
}

/// One full pass over the inbound directory. `Ok(None)` means no arrival
/// file was waiting, the normal idle outcome.
pub async fn run_once(
    config: &RunConfig,
    classifier: &dyn Classifier,
    lookup: Option<&dyn DeliveryLookup>,
) -> anyhow::Result<Option<RunReport>> {
    // --- Step 1: Detect and claim ---
    let file_name =
        match archive::check_for_new_file(&config.inbound.dir, &config.inbound.prefix)? {
            Some(name) => name,
            None => {
                info!(dir = %config.inbound.dir.display(), "No arrival file; nothing to do");
                return Ok(None);
            }
        };
    info!(file = %file_name, "Processing arrival file");
    let claimed = archive::claim_file(&config.inbound.dir, &file_name)?;

    // --- Step 2: Load and build the batch ---
    let text = parse::load_file(&claimed)
        .with_context(|| format!("loading claimed file {}", claimed.display()))?;
    let now = chrono::Local::now().naive_local();
    let datetime_stamp = archive::make_datetime_stamp(now);
    let outcome = process_export(&text, classifier, lookup, now)
        .await
        .with_context(|| format!("parsing claimed file {}", claimed.display()))?;
    for failure in &outcome.failures {
        error!(index = failure.index, error = %failure.error, "Record not forwarded to GFA");
    }

    // --- Step 3: Archive and emit ---
    let parsed_text = gfa::stringify_batch(&outcome.records);
    let archived_original = archive::copy_original_to_archives(
        &claimed,
        &datetime_stamp,
        &config.archive.originals_dir,
    )?;
    archive::save_parsed_to_archives(&parsed_text, &datetime_stamp, &config.archive.parsed_dir)?;
    let gfa_data_file =
        archive::send_gfa_data_file(&parsed_text, &datetime_stamp, &config.gfa.data_dir)?;
    let gfa_count_file =
        archive::send_gfa_count_file(outcome.records.len(), &datetime_stamp, &config.gfa.count_dir)?;
    archive::remove_claimed(&claimed)?;

    let report = RunReport {
        arrival_file: file_name,
        datetime_stamp,
        built: outcome.records.len(),
        failed: outcome.failures.len(),
        archived_original,
        gfa_data_file,
        gfa_count_file,
    };
    info!(
        built = report.built,
        failed = report.failed,
        stamp = %report.datetime_stamp,
        "Run complete"
    );
    Ok(Some(report))
}
