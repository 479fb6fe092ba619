//! Vocabulary construction: scans text corpora, accumulates token (or
//! character) frequencies and produces [`Dictionary`] values.
//!
//! Building is deterministic: identical inputs always yield identical
//! token to id mappings, and the order in which corpus files are listed
//! does not change the result for any tokens with distinct frequencies
//! (counts are accumulated across all files before ranking; equal-count
//! tokens keep first-occurrence order).

use crate::config::PreprocessConfig;
use crate::dictionary::{Dictionary, FrequencyTable};
use crate::errors::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// The dictionaries one preprocessing run produces. Char entries are
/// `None` unless the configured architecture requires them.
#[derive(Debug, Clone)]
pub struct VocabSet {
    pub source: Dictionary,
    pub target: Dictionary,
    pub char_source: Option<Dictionary>,
    pub char_target: Option<Dictionary>,
}

/// Calls `visit` once per physical line (trailing `\r`/`\n` stripped)
/// and returns the number of lines seen.
pub(crate) fn scan_lines<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(&str),
{
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let mut count = 0;
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        while line.ends_with(['\r', '\n']) {
            line.pop();
        }
        visit(&line);
        count += 1;
    }
    Ok(count)
}

fn accumulate(paths: &[PathBuf], chars: bool) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    let mut buf = String::new();
    for path in paths {
        let lines = scan_lines(path, |line| {
            for token in line.split_whitespace() {
                if chars {
                    for ch in token.chars() {
                        buf.clear();
                        buf.push(ch);
                        table.record(&buf);
                    }
                } else {
                    table.record(token);
                }
            }
        })?;
        log::info!("counted tokens over {} lines from {}", lines, path.display());
    }
    Ok(table)
}

/// Builds a word-level dictionary over every listed corpus file.
///
/// An empty corpus is not an error: the result then holds only the
/// reserved symbols.
pub fn build_word_dictionary(paths: &[PathBuf], max_size: Option<usize>) -> Result<Dictionary> {
    let table = accumulate(paths, false)?;
    Ok(Dictionary::from_counts(&table, max_size))
}

/// Builds a character-level dictionary: each whitespace token is split
/// into its characters before counting. `max_size` of `None` keeps every
/// observed character.
pub fn build_char_dictionary(paths: &[PathBuf], max_size: Option<usize>) -> Result<Dictionary> {
    let table = accumulate(paths, true)?;
    Ok(Dictionary::from_counts(&table, max_size))
}

/// Builds every dictionary the configuration asks for from the training
/// texts and persists each one to its configured vocabulary file.
pub fn build_vocabs(cfg: &PreprocessConfig) -> Result<VocabSet> {
    let source_paths = [cfg.corpora.train_source_text.clone()];
    let target_paths = [cfg.corpora.train_target_text.clone()];

    let source = build_word_dictionary(&source_paths, cfg.vocab.source_max_size)?;
    source.save(&cfg.vocab.source_vocab_file)?;
    log::info!(
        "source vocabulary: {} entries -> {}",
        source.len(),
        cfg.vocab.source_vocab_file.display()
    );

    let target = build_word_dictionary(&target_paths, cfg.vocab.target_max_size)?;
    target.save(&cfg.vocab.target_vocab_file)?;
    log::info!(
        "target vocabulary: {} entries -> {}",
        target.len(),
        cfg.vocab.target_vocab_file.display()
    );

    let (char_source, char_target) = if cfg.arch.requires_char_vocab() {
        let char_source_file = cfg.vocab.char_source_vocab_file.as_ref().ok_or(
            Error::InvalidConfig("char_source_vocab_file required for char-aware architectures"),
        )?;
        let char_target_file = cfg.vocab.char_target_vocab_file.as_ref().ok_or(
            Error::InvalidConfig("char_target_vocab_file required for char-aware architectures"),
        )?;

        let char_source = build_char_dictionary(&source_paths, cfg.vocab.char_source_max_size)?;
        char_source.save(char_source_file)?;
        let char_target = build_char_dictionary(&target_paths, cfg.vocab.char_target_max_size)?;
        char_target.save(char_target_file)?;
        (Some(char_source), Some(char_target))
    } else {
        (None, None)
    };

    Ok(VocabSet {
        source,
        target,
        char_source,
        char_target,
    })
}
