//! Preprocessing manifest: a small JSON record of what a run produced,
//! keyed by a hash of the configuration and the input corpus bytes so a
//! consumer can tell whether existing artifacts match a configuration.

use crate::config::PreprocessConfig;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessManifest {
    pub cfg_hash: String,
    pub created_at: String,
    pub source_vocab_size: usize,
    pub target_vocab_size: usize,
    pub char_source_vocab_size: Option<usize>,
    pub char_target_vocab_size: Option<usize>,
    pub archives: BTreeMap<String, ArchiveStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub path: PathBuf,
    pub lines: usize,
    pub tokens: usize,
}

/// Hashes the serialized configuration followed by the contents of every
/// input corpus file, in the given order.
pub fn compute_config_hash(cfg: &PreprocessConfig, corpus_files: &[&Path]) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(&serde_json::to_vec(cfg)?);

    let mut buffer = [0u8; 8 * 1024];
    for path in corpus_files {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        hasher.update(path.to_string_lossy().as_bytes());
        let mut reader = BufReader::new(File::open(path)?);
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn unix_timestamp() -> Result<String> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Validation(format!("failed to compute timestamp: {e}")))?
        .as_secs();
    Ok(format!("unix:{secs}"))
}

pub fn write_manifest(path: &Path, manifest: &PreprocessManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<PreprocessManifest> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let manifest = serde_json::from_reader(reader)?;
    Ok(manifest)
}
