//! Corpus binarization: turns a tokenized text file into a
//! [`CorpusArchive`] of dictionary ids.
//!
//! Every physical line becomes exactly one id sequence, so the archive's
//! line count always equals the text file's. When both options are set,
//! reversal is applied to the encoded sequence first and the
//! end-of-sequence id is appended afterwards; an appended eos is
//! therefore always the last id.

use crate::archive::CorpusArchive;
use crate::dictionary::Dictionary;
use crate::errors::{Error, Result};
use crate::vocab::scan_lines;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinarizeOptions {
    pub append_eos: bool,
    pub reverse: bool,
}

/// Encodes every line of `text` through `dict`.
///
/// Fails with `FileNotFound` if `text` does not exist and with
/// `EmptyCorpus` if it contains zero lines.
pub fn binarize(text: &Path, dict: &Dictionary, opts: BinarizeOptions) -> Result<CorpusArchive> {
    let mut archive = CorpusArchive::new();
    let mut ids: Vec<i32> = Vec::new();

    let lines = scan_lines(text, |line| {
        ids.clear();
        ids.extend(
            line.split_whitespace()
                .map(|token| dict.index(token) as i32),
        );
        if opts.reverse {
            ids.reverse();
        }
        if opts.append_eos {
            ids.push(dict.eos_index() as i32);
        }
        archive.push(&ids);
    })?;

    if lines == 0 {
        return Err(Error::EmptyCorpus(text.to_path_buf()));
    }

    log::info!(
        "binarized {} lines ({} tokens) from {}",
        archive.len(),
        archive.num_tokens(),
        text.display()
    );
    Ok(archive)
}

/// Binarizes `text` and writes the archive to `out`.
pub fn binarize_to_path(
    text: &Path,
    dict: &Dictionary,
    opts: BinarizeOptions,
    out: &Path,
) -> Result<CorpusArchive> {
    let archive = binarize(text, dict, opts)?;
    archive.write(out)?;
    Ok(archive)
}
