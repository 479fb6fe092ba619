//! Corpus preprocessing for machine-translation training.
//!
//! The crate prepares raw parallel (and optionally monolingual) text for
//! a training loop in two steps, both driven by a [`PreprocessConfig`]:
//!
//! 1. **Vocabulary construction** — whitespace tokens (and, for
//!    char-aware architectures, their characters) are counted across the
//!    training corpora and turned into size-limited [`Dictionary`]
//!    values with reserved `<pad>`/`</s>`/`<unk>` symbols, persisted as
//!    line-oriented vocabulary files.
//! 2. **Binarization** — each corpus line is mapped to a dictionary-id
//!    sequence (with configurable end-of-sequence appending and source
//!    reversal) and the sequences are stored in compressed `.npz`
//!    archives of concatenated ids plus per-line offsets.
//!
//! [`preprocess_corpora`] runs the whole pipeline and returns a new
//! configuration with every output path recorded; the caller's value is
//! never mutated. Identical inputs always produce identical vocabularies
//! and archives, which training reproducibility depends on.

pub mod archive;
pub mod binarize;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod manifest;
pub mod validate;
pub mod vocab;

mod preprocess;

pub use archive::CorpusArchive;
pub use binarize::{binarize, binarize_to_path, BinarizeOptions};
pub use config::{
    ArchitectureKind, BinarizationCfg, BinaryPathsCfg, CorporaCfg, PreprocessConfig, TaskKind,
    VocabCfg,
};
pub use dictionary::{Dictionary, FrequencyTable, EOS_TOKEN, NUM_RESERVED, PAD_TOKEN, UNK_TOKEN};
pub use errors::{Error, Result};
pub use preprocess::preprocess_corpora;
pub use vocab::{build_char_dictionary, build_vocabs, build_word_dictionary, VocabSet};
