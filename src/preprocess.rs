//! Orchestrates a preprocessing run: vocabulary construction followed by
//! corpus binarization, driven entirely by a [`PreprocessConfig`].
//!
//! The orchestrator never mutates its input; it returns a new
//! configuration with every produced archive path filled in. Validation
//! runs first, so nothing is written when the configuration is bad.

use crate::archive::CorpusArchive;
use crate::binarize::{binarize_to_path, BinarizeOptions};
use crate::config::PreprocessConfig;
use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::manifest::{
    compute_config_hash, unix_timestamp, write_manifest, ArchiveStats, PreprocessManifest,
};
use crate::validate::validate_config;
use crate::vocab::{build_vocabs, VocabSet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

struct BinarizeJob<'a> {
    role: &'static str,
    text: &'a Path,
    dict: &'a Dictionary,
    opts: BinarizeOptions,
    explicit_out: Option<&'a PathBuf>,
}

pub fn preprocess_corpora(cfg: &PreprocessConfig) -> Result<PreprocessConfig> {
    validate_config(cfg)?;

    let vocabs = build_vocabs(cfg)?;

    // Flags govern the source side only; target sequences always end
    // with eos and are never reversed.
    let source_opts = BinarizeOptions {
        append_eos: cfg.binarization.append_eos_to_source,
        reverse: cfg.binarization.reverse_source,
    };
    let target_opts = BinarizeOptions {
        append_eos: true,
        reverse: false,
    };

    let mut jobs = vec![
        BinarizeJob {
            role: "train_source",
            text: &cfg.corpora.train_source_text,
            dict: &vocabs.source,
            opts: source_opts,
            explicit_out: cfg.binaries.train_source.as_ref(),
        },
        BinarizeJob {
            role: "train_target",
            text: &cfg.corpora.train_target_text,
            dict: &vocabs.target,
            opts: target_opts,
            explicit_out: cfg.binaries.train_target.as_ref(),
        },
        BinarizeJob {
            role: "eval_source",
            text: &cfg.corpora.eval_source_text,
            dict: &vocabs.source,
            opts: source_opts,
            explicit_out: cfg.binaries.eval_source.as_ref(),
        },
        BinarizeJob {
            role: "eval_target",
            text: &cfg.corpora.eval_target_text,
            dict: &vocabs.target,
            opts: target_opts,
            explicit_out: cfg.binaries.eval_target.as_ref(),
        },
    ];

    if cfg.is_semi_supervised() {
        if let Some(text) = &cfg.corpora.train_mono_source_text {
            jobs.push(BinarizeJob {
                role: "train_mono_source",
                text,
                dict: &vocabs.source,
                opts: source_opts,
                explicit_out: cfg.binaries.train_mono_source.as_ref(),
            });
        }
        if let Some(text) = &cfg.corpora.train_mono_target_text {
            jobs.push(BinarizeJob {
                role: "train_mono_target",
                text,
                dict: &vocabs.target,
                opts: target_opts,
                explicit_out: cfg.binaries.train_mono_target.as_ref(),
            });
        }
    }

    let mut out = cfg.clone();
    let mut stats: BTreeMap<String, ArchiveStats> = BTreeMap::new();
    for job in jobs {
        let out_path = resolve_binary_path(job.text, job.role, job.explicit_out);
        let archive = binarize_to_path(job.text, job.dict, job.opts, &out_path)?;
        record_output(&mut out, job.role, &out_path);
        stats.insert(job.role.to_string(), archive_stats(&archive, &out_path));
    }

    if let Some(manifest_path) = &cfg.manifest {
        let manifest = build_manifest(cfg, &vocabs, stats)?;
        write_manifest(manifest_path, &manifest)?;
        log::info!("wrote manifest to {}", manifest_path.display());
    }

    Ok(out)
}

/// The explicitly configured path, or `<text dir>/<role>.npz`. Deriving
/// from the role rather than the text file name keeps train and eval
/// outputs distinct when both point at the same text file.
fn resolve_binary_path(text: &Path, role: &str, explicit: Option<&PathBuf>) -> PathBuf {
    match explicit {
        Some(path) => path.clone(),
        None => {
            let dir = text.parent().unwrap_or_else(|| Path::new(""));
            dir.join(format!("{role}.npz"))
        }
    }
}

fn record_output(cfg: &mut PreprocessConfig, role: &str, path: &Path) {
    let slot = match role {
        "train_source" => &mut cfg.binaries.train_source,
        "train_target" => &mut cfg.binaries.train_target,
        "eval_source" => &mut cfg.binaries.eval_source,
        "eval_target" => &mut cfg.binaries.eval_target,
        "train_mono_source" => &mut cfg.binaries.train_mono_source,
        "train_mono_target" => &mut cfg.binaries.train_mono_target,
        _ => unreachable!("unknown binarization role"),
    };
    *slot = Some(path.to_path_buf());
}

fn archive_stats(archive: &CorpusArchive, path: &Path) -> ArchiveStats {
    ArchiveStats {
        path: path.to_path_buf(),
        lines: archive.len(),
        tokens: archive.num_tokens(),
    }
}

fn build_manifest(
    cfg: &PreprocessConfig,
    vocabs: &VocabSet,
    archives: BTreeMap<String, ArchiveStats>,
) -> Result<PreprocessManifest> {
    let mut corpus_files: Vec<&Path> = vec![
        &cfg.corpora.train_source_text,
        &cfg.corpora.train_target_text,
        &cfg.corpora.eval_source_text,
        &cfg.corpora.eval_target_text,
    ];
    if cfg.is_semi_supervised() {
        corpus_files.extend(
            [
                &cfg.corpora.train_mono_source_text,
                &cfg.corpora.train_mono_target_text,
            ]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path),
        );
    }

    Ok(PreprocessManifest {
        cfg_hash: compute_config_hash(cfg, &corpus_files)?,
        created_at: unix_timestamp()?,
        source_vocab_size: vocabs.source.len(),
        target_vocab_size: vocabs.target.len(),
        char_source_vocab_size: vocabs.char_source.as_ref().map(Dictionary::len),
        char_target_vocab_size: vocabs.char_target.as_ref().map(Dictionary::len),
        archives,
    })
}
