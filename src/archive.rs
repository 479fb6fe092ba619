//! Persisted token-id archives.
//!
//! A [`CorpusArchive`] holds one id sequence per corpus line, stored flat
//! as concatenated ids plus prefix offsets (`lines + 1` entries, so line
//! `i` spans `offsets[i]..offsets[i + 1]`). On disk it is a compressed
//! `.npz` container with two named arrays, `token_ids` (i32) and
//! `offsets` (u64). Writes go to a temporary sibling file that is renamed
//! into place, so a crashed run never leaves a half-written archive.

use crate::errors::{Error, Result};
use ndarray::Array1;
use ndarray_npy::{NpzReader, NpzWriter};
use std::fs::{self, File};
use std::path::Path;

const TOKEN_IDS_ENTRY: &str = "token_ids";
const OFFSETS_ENTRY: &str = "offsets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusArchive {
    token_ids: Vec<i32>,
    offsets: Vec<u64>,
}

impl Default for CorpusArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusArchive {
    pub fn new() -> Self {
        CorpusArchive {
            token_ids: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Appends one line's id sequence.
    pub fn push(&mut self, ids: &[i32]) {
        self.token_ids.extend_from_slice(ids);
        self.offsets.push(self.token_ids.len() as u64);
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of ids across all lines.
    pub fn num_tokens(&self) -> usize {
        self.token_ids.len()
    }

    /// The id sequence of line `i`, or `None` past the end.
    pub fn sentence(&self, i: usize) -> Option<&[i32]> {
        if i >= self.len() {
            return None;
        }
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        Some(&self.token_ids[start..end])
    }

    pub fn sentences(&self) -> impl Iterator<Item = &[i32]> {
        (0..self.len()).map(move |i| {
            let start = self.offsets[i] as usize;
            let end = self.offsets[i + 1] as usize;
            &self.token_ids[start..end]
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = tmp_sibling(path);
        {
            let mut npz = NpzWriter::new_compressed(File::create(&tmp)?);
            npz.add_array(TOKEN_IDS_ENTRY, &Array1::from_vec(self.token_ids.clone()))?;
            npz.add_array(OFFSETS_ENTRY, &Array1::from_vec(self.offsets.clone()))?;
            npz.finish()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let mut npz = NpzReader::new(File::open(path)?)?;
        let token_ids: Array1<i32> = npz.by_name(TOKEN_IDS_ENTRY)?;
        let offsets: Array1<u64> = npz.by_name(OFFSETS_ENTRY)?;

        let archive = CorpusArchive {
            token_ids: token_ids.to_vec(),
            offsets: offsets.to_vec(),
        };
        archive.validate(path)?;
        Ok(archive)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let ok = self.offsets.first() == Some(&0)
            && self.offsets.windows(2).all(|w| w[0] <= w[1])
            && self.offsets.last() == Some(&(self.token_ids.len() as u64));
        if ok {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "inconsistent offsets in archive {}",
                path.display()
            )))
        }
    }
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_slice() {
        let mut archive = CorpusArchive::new();
        archive.push(&[3, 4, 5]);
        archive.push(&[]);
        archive.push(&[6]);

        assert_eq!(archive.len(), 3);
        assert_eq!(archive.num_tokens(), 4);
        assert_eq!(archive.sentence(0).unwrap(), &[3, 4, 5]);
        assert_eq!(archive.sentence(1).unwrap(), &[] as &[i32]);
        assert_eq!(archive.sentence(2).unwrap(), &[6]);
        assert!(archive.sentence(3).is_none());
    }

    #[test]
    fn write_read_roundtrip() {
        let mut archive = CorpusArchive::new();
        archive.push(&[1, 2, 3]);
        archive.push(&[4, 5]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.npz");
        archive.write(&path).unwrap();

        let loaded = CorpusArchive::read(&path).unwrap();
        assert_eq!(loaded, archive);
    }

    #[test]
    fn read_missing_archive_fails() {
        let err = CorpusArchive::read(Path::new("/nonexistent/corpus.npz")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let mut archive = CorpusArchive::new();
        archive.push(&[1]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.npz");
        archive.write(&path).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
