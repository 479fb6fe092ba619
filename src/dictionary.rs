//! Token dictionary: a bidirectional mapping between token strings and
//! dense integer ids, with reserved symbols at fixed low indices.
//!
//! Ids are contiguous from `0` to `len - 1`. The first three ids are
//! always `<pad>`, `</s>` and `<unk>`, regardless of corpus content, so
//! downstream consumers can rely on their positions.

use crate::errors::{Error, Result};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const PAD_TOKEN: &str = "<pad>";
pub const EOS_TOKEN: &str = "</s>";
pub const UNK_TOKEN: &str = "<unk>";

/// Number of reserved symbols occupying the lowest indices.
pub const NUM_RESERVED: usize = 3;

const RESERVED: [&str; NUM_RESERVED] = [PAD_TOKEN, EOS_TOKEN, UNK_TOKEN];

/// Insertion-ordered token counter. Keeping first-occurrence order lets
/// [`Dictionary::from_counts`] break frequency ties deterministically.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), 1));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, token: &str) -> u64 {
        self.index.get(token).map_or(0, |&i| self.entries[i].1)
    }

    /// Entries ordered by descending count; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|(tok, n)| (tok.as_str(), *n))
            .collect();
        // sort_by_key is stable, so equal counts retain insertion order.
        ranked.sort_by_key(|&(_, n)| Reverse(n));
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct Dictionary {
    tokens: Vec<String>,
    counts: Vec<u64>,
    indices: HashMap<String, usize>,
}

impl Dictionary {
    fn with_reserved() -> Self {
        let mut dict = Dictionary {
            tokens: Vec::new(),
            counts: Vec::new(),
            indices: HashMap::new(),
        };
        for sym in RESERVED {
            dict.push(sym.to_string(), 0);
        }
        dict
    }

    fn push(&mut self, token: String, count: u64) {
        let id = self.tokens.len();
        self.indices.insert(token.clone(), id);
        self.tokens.push(token);
        self.counts.push(count);
    }

    /// Builds a dictionary from corpus statistics: tokens ordered by
    /// descending frequency (first-seen order on ties), truncated so the
    /// total size, reserved symbols included, stays within `max_size`.
    ///
    /// Reserved symbols occurring as literal corpus tokens are skipped
    /// rather than duplicated.
    pub fn from_counts(table: &FrequencyTable, max_size: Option<usize>) -> Self {
        let mut dict = Self::with_reserved();
        for (token, count) in table.ranked() {
            if let Some(limit) = max_size {
                if dict.len() >= limit {
                    break;
                }
            }
            if RESERVED.contains(&token) {
                continue;
            }
            dict.push(token.to_string(), count);
        }
        dict
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn pad_index(&self) -> usize {
        0
    }

    pub fn eos_index(&self) -> usize {
        1
    }

    pub fn unk_index(&self) -> usize {
        2
    }

    /// Returns the id for `token`, or the unknown-symbol id if absent.
    pub fn index(&self, token: &str) -> usize {
        self.indices
            .get(token)
            .copied()
            .unwrap_or_else(|| self.unk_index())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.indices.contains_key(token)
    }

    /// Returns the token for `id`, or `IdOutOfRange` past the end.
    pub fn token(&self, id: usize) -> Result<&str> {
        self.tokens
            .get(id)
            .map(String::as_str)
            .ok_or(Error::IdOutOfRange {
                id,
                size: self.tokens.len(),
            })
    }

    /// Writes the dictionary as one `token count` pair per line, in index
    /// order. Reserved symbols are not serialized; [`load`](Self::load)
    /// re-adds them, so a round-trip reproduces identical indices.
    ///
    /// The file is written to a temporary sibling path and renamed into
    /// place so readers never observe a half-written vocabulary.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = tmp_sibling(path);
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            for id in RESERVED.len()..self.tokens.len() {
                writeln!(writer, "{} {}", self.tokens[id], self.counts[id])?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let mut dict = Self::with_reserved();
        let reader = BufReader::new(File::open(path)?);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let (token, count) = line.rsplit_once(' ').ok_or_else(|| {
                Error::Validation(format!(
                    "malformed vocabulary line {} in {}: expected 'token count'",
                    lineno + 1,
                    path.display()
                ))
            })?;
            let count: u64 = count.parse().map_err(|_| {
                Error::Validation(format!(
                    "malformed count on line {} in {}",
                    lineno + 1,
                    path.display()
                ))
            })?;
            if dict.indices.contains_key(token) {
                return Err(Error::Validation(format!(
                    "duplicate token '{}' on line {} in {}",
                    token,
                    lineno + 1,
                    path.display()
                )));
            }
            dict.push(token.to_string(), count);
        }
        Ok(dict)
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

    fn table(tokens: &[&str]) -> FrequencyTable {
        let mut t = FrequencyTable::new();
        for tok in tokens {
            t.record(tok);
        }
        t
    }

    #[test]
    fn reserved_symbols_present_at_fixed_indices() {
        let dict = Dictionary::from_counts(&FrequencyTable::new(), None);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.token(0).unwrap(), PAD_TOKEN);
        assert_eq!(dict.token(1).unwrap(), EOS_TOKEN);
        assert_eq!(dict.token(2).unwrap(), UNK_TOKEN);
        assert_eq!(dict.index(PAD_TOKEN), dict.pad_index());
        assert_eq!(dict.index(EOS_TOKEN), dict.eos_index());
        assert_eq!(dict.index(UNK_TOKEN), dict.unk_index());
    }

    #[test]
    fn orders_by_descending_frequency() {
        let t = table(&["b", "a", "a", "c", "a", "b"]);
        let dict = Dictionary::from_counts(&t, None);
        assert_eq!(dict.token(3).unwrap(), "a");
        assert_eq!(dict.token(4).unwrap(), "b");
        assert_eq!(dict.token(5).unwrap(), "c");
    }

    #[test]
    fn ties_break_on_first_occurrence() {
        let t = table(&["z", "m", "q"]);
        let dict = Dictionary::from_counts(&t, None);
        assert_eq!(dict.token(3).unwrap(), "z");
        assert_eq!(dict.token(4).unwrap(), "m");
        assert_eq!(dict.token(5).unwrap(), "q");
    }

    #[test]
    fn max_size_caps_total_size() {
        let t = table(&["a", "a", "b", "b", "c", "d"]);
        let dict = Dictionary::from_counts(&t, Some(5));
        assert_eq!(dict.len(), 5);
        assert!(dict.contains("a"));
        assert!(dict.contains("b"));
        assert!(!dict.contains("d"));
    }

    #[test]
    fn unknown_token_maps_to_unk() {
        let t = table(&["a", "b", "c"]);
        let dict = Dictionary::from_counts(&t, Some(10));
        assert_eq!(dict.index("z"), dict.unk_index());
        assert_eq!(dict.index("a"), 3);
    }

    #[test]
    fn decode_out_of_range_fails() {
        let dict = Dictionary::from_counts(&FrequencyTable::new(), None);
        let err = dict.token(99).unwrap_err();
        assert!(matches!(err, Error::IdOutOfRange { id: 99, size: 3 }));
    }

    #[test]
    fn reserved_tokens_in_corpus_are_not_duplicated() {
        let t = table(&["a", UNK_TOKEN, PAD_TOKEN, "a"]);
        let dict = Dictionary::from_counts(&t, None);
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.token(3).unwrap(), "a");
    }

    #[test]
    fn save_load_roundtrip_preserves_indices() {
        let t = table(&["hello", "world", "world", "again"]);
        let dict = Dictionary::from_counts(&t, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        dict.save(&path).unwrap();

        let loaded = Dictionary::load(&path).unwrap();
        assert_eq!(loaded.len(), dict.len());
        for id in 0..dict.len() {
            assert_eq!(loaded.token(id).unwrap(), dict.token(id).unwrap());
        }
        assert_eq!(loaded.index("world"), dict.index("world"));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = Dictionary::load(Path::new("/nonexistent/vocab.txt")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
