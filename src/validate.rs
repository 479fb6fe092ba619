//! Eager configuration validation.
//!
//! Every check here runs before any vocabulary is counted or archive
//! written, so a bad configuration fails fast with the offending path or
//! flag named and no partial output on disk.

use crate::config::PreprocessConfig;
use crate::dictionary::NUM_RESERVED;
use crate::errors::{Error, Result};
use std::path::Path;

pub fn validate_config(cfg: &PreprocessConfig) -> Result<()> {
    ensure_corpus(&cfg.corpora.train_source_text)?;
    ensure_corpus(&cfg.corpora.train_target_text)?;
    ensure_corpus(&cfg.corpora.eval_source_text)?;
    ensure_corpus(&cfg.corpora.eval_target_text)?;

    if cfg.is_semi_supervised() {
        if let Some(path) = &cfg.corpora.train_mono_source_text {
            ensure_corpus(path)?;
        }
        if let Some(path) = &cfg.corpora.train_mono_target_text {
            ensure_corpus(path)?;
        }
    } else if cfg.corpora.train_mono_source_text.is_some()
        || cfg.corpora.train_mono_target_text.is_some()
    {
        log::warn!("monolingual corpora configured but task is bilingual; they will be ignored");
    }

    ensure_max_size("vocab.source_max_size", cfg.vocab.source_max_size)?;
    ensure_max_size("vocab.target_max_size", cfg.vocab.target_max_size)?;
    ensure_max_size("vocab.char_source_max_size", cfg.vocab.char_source_max_size)?;
    ensure_max_size("vocab.char_target_max_size", cfg.vocab.char_target_max_size)?;

    if cfg.arch.requires_char_vocab() {
        if cfg.vocab.char_source_vocab_file.is_none() {
            return Err(Error::InvalidConfig(
                "char_source_vocab_file required for char-aware architectures",
            ));
        }
        if cfg.vocab.char_target_vocab_file.is_none() {
            return Err(Error::InvalidConfig(
                "char_target_vocab_file required for char-aware architectures",
            ));
        }
    }

    ensure_parent_creatable(&cfg.vocab.source_vocab_file)?;
    ensure_parent_creatable(&cfg.vocab.target_vocab_file)?;
    for path in [
        &cfg.vocab.char_source_vocab_file,
        &cfg.vocab.char_target_vocab_file,
        &cfg.manifest,
    ]
    .into_iter()
    .flatten()
    {
        ensure_parent_creatable(path)?;
    }

    Ok(())
}

fn ensure_corpus(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}

fn ensure_max_size(name: &str, value: Option<usize>) -> Result<()> {
    match value {
        Some(limit) if limit <= NUM_RESERVED => Err(Error::Validation(format!(
            "{name} must leave room for the {NUM_RESERVED} reserved symbols (got {limit})"
        ))),
        _ => Ok(()),
    }
}

fn ensure_parent_creatable(path: &Path) -> Result<()> {
    match path.parent() {
        None => Ok(()),
        Some(parent) if parent.as_os_str().is_empty() => Ok(()),
        Some(parent) => {
            if parent.exists() && !parent.is_dir() {
                Err(Error::Validation(format!(
                    "output parent '{}' exists but is not a directory",
                    parent.display()
                )))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use std::fs;
    use std::path::PathBuf;

    fn base_config(dir: &Path) -> PreprocessConfig {
        let text = dir.join("text.txt");
        fs::write(&text, "a b c\n").unwrap();
        PreprocessConfig {
            task: TaskKind::Bilingual,
            arch: ArchitectureKind::Rnn,
            corpora: CorporaCfg {
                train_source_text: text.clone(),
                train_target_text: text.clone(),
                eval_source_text: text.clone(),
                eval_target_text: text,
                train_mono_source_text: None,
                train_mono_target_text: None,
            },
            vocab: VocabCfg {
                source_vocab_file: dir.join("vocab.src.txt"),
                target_vocab_file: dir.join("vocab.tgt.txt"),
                source_max_size: None,
                target_max_size: None,
                char_source_vocab_file: None,
                char_target_vocab_file: None,
                char_source_max_size: None,
                char_target_max_size: None,
            },
            binarization: BinarizationCfg {
                append_eos_to_source: false,
                reverse_source: false,
            },
            binaries: BinaryPathsCfg::default(),
            manifest: None,
        }
    }

    #[test]
    fn accepts_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        validate_config(&base_config(dir.path())).unwrap();
    }

    #[test]
    fn rejects_missing_corpus_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.corpora.eval_target_text = PathBuf::from("/nonexistent/eval.tgt");
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn rejects_char_arch_without_char_vocab_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.arch = ArchitectureKind::CharAwareHybrid;
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_vocab_size_smaller_than_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.vocab.source_max_size = Some(2);
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_mono_corpus_fails_for_semi_supervised() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.task = TaskKind::SemiSupervised;
        cfg.corpora.train_mono_source_text = Some(PathBuf::from("/nonexistent/mono.src"));
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
