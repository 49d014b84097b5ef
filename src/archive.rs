//! File lifecycle for one run: arrival detection, the claim rename,
//! verified archive copies, and the GFA hand-off files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Suffix marking an arrival file claimed by a running pass.
pub const CLAIM_SUFFIX: &str = ".processing";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("i/o failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("copy verification failed: digests of {} and {} differ", .src.display(), .dest.display())]
    CopyMismatch { src: PathBuf, dest: PathBuf },
    #[error("write verification failed for {}: read-back differs", .path.display())]
    WriteMismatch { path: PathBuf },
}

fn io_at(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Looks for an arrival file in `dir`: the lexicographically first regular
/// file whose name starts with `prefix`. Files already claimed by a pass
/// are skipped. `None` means nothing is waiting, the normal idle outcome.
pub fn check_for_new_file(dir: &Path, prefix: &str) -> Result<Option<String>, ArchiveError> {
    let entries = fs::read_dir(dir).map_err(|e| io_at(dir, e))?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_at(dir, e))?;
        let file_type = entry.file_type().map_err(|e| io_at(&entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if name.starts_with(prefix) && !name.ends_with(CLAIM_SUFFIX) {
            names.push(name);
        }
    }
    names.sort();
    let found = names.into_iter().next();
    match &found {
        Some(name) => debug!(dir = %dir.display(), file = %name, "Arrival file detected"),
        None => debug!(dir = %dir.display(), "No arrival file waiting"),
    }
    Ok(found)
}

/// Claims the arrival file by renaming it before anything reads it, so a
/// second pass started during processing cannot pick it up. Returns the
/// claimed path.
pub fn claim_file(dir: &Path, file_name: &str) -> Result<PathBuf, ArchiveError> {
    let source = dir.join(file_name);
    let claimed = dir.join(format!("{file_name}{CLAIM_SUFFIX}"));
    fs::rename(&source, &claimed).map_err(|e| io_at(&source, e))?;
    info!(from = %source.display(), to = %claimed.display(), "Claimed arrival file");
    Ok(claimed)
}

/// Removes the claimed arrival file once every artifact is in place.
pub fn remove_claimed(path: &Path) -> Result<(), ArchiveError> {
    fs::remove_file(path).map_err(|e| io_at(path, e))?;
    info!(path = %path.display(), "Removed claimed arrival file");
    Ok(())
}

/// Filename stamp with second granularity, e.g. `2021-07-13T14-40-49`.
pub fn make_datetime_stamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Copies the claimed original into the archive directory as
/// `REQ-ALMA-ORIG_<stamp>.xml`, then re-reads both sides and compares
/// SHA-256 digests. Returns the destination path.
pub fn copy_original_to_archives(
    source: &Path,
    datetime_stamp: &str,
    destination_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(destination_dir).map_err(|e| io_at(destination_dir, e))?;
    let destination = destination_dir.join(format!("REQ-ALMA-ORIG_{datetime_stamp}.xml"));
    fs::copy(source, &destination).map_err(|e| io_at(&destination, e))?;
    if file_digest(source)? != file_digest(&destination)? {
        return Err(ArchiveError::CopyMismatch {
            src: source.to_path_buf(),
            dest: destination,
        });
    }
    info!(path = %destination.display(), "Archived original export");
    Ok(destination)
}

fn file_digest(path: &Path) -> Result<String, ArchiveError> {
    let bytes = fs::read(path).map_err(|e| io_at(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Writes the serialized batch to the archive directory as
/// `REQ-ALMA-PARSED_<stamp>.txt`.
pub fn save_parsed_to_archives(
    text: &str,
    datetime_stamp: &str,
    destination_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    let file_name = format!("REQ-ALMA-PARSED_{datetime_stamp}.txt");
    write_verified(text, destination_dir, &file_name)
}

/// Hands the data file to GFA as `REQ-GFA_<stamp>.dat`.
pub fn send_gfa_data_file(
    text: &str,
    datetime_stamp: &str,
    destination_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    let file_name = format!("REQ-GFA_{datetime_stamp}.dat");
    write_verified(text, destination_dir, &file_name)
}

/// Hands the record count to GFA as `REQ-GFA_<stamp>.cnt`, a bare integer.
pub fn send_gfa_count_file(
    count: usize,
    datetime_stamp: &str,
    destination_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    let file_name = format!("REQ-GFA_{datetime_stamp}.cnt");
    write_verified(&count.to_string(), destination_dir, &file_name)
}

/// Writes `content` through a temp file in the same directory, re-reads it,
/// and persists under the final name only when the read-back matches. The
/// GFA side sweeps its drop directories as soon as a name appears, so a
/// partially written file must never be visible under its final name.
fn write_verified(content: &str, dir: &Path, file_name: &str) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(dir).map_err(|e| io_at(dir, e))?;
    let destination = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_at(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| io_at(tmp.path(), e))?;
    tmp.flush().map_err(|e| io_at(tmp.path(), e))?;
    let read_back = fs::read_to_string(tmp.path()).map_err(|e| io_at(tmp.path(), e))?;
    if read_back != content {
        return Err(ArchiveError::WriteMismatch { path: destination });
    }
    tmp.persist(&destination)
        .map_err(|e| io_at(&destination, e.error))?;
    debug!(path = %destination.display(), bytes = content.len(), "Wrote artifact");
    Ok(destination)
}
