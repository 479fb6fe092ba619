use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub task: TaskKind,
    pub arch: ArchitectureKind,
    pub corpora: CorporaCfg,
    pub vocab: VocabCfg,
    pub binarization: BinarizationCfg,
    #[serde(default)]
    pub binaries: BinaryPathsCfg,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Bilingual,
    SemiSupervised,
}

/// Model architecture the preprocessed data is destined for. Whether
/// character vocabularies are required is a property of the variant,
/// decided here rather than by string comparison at use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureKind {
    Rnn,
    Transformer,
    CharSource,
    CharAwareHybrid,
}

impl ArchitectureKind {
    pub fn requires_char_vocab(&self) -> bool {
        matches!(
            self,
            ArchitectureKind::CharSource | ArchitectureKind::CharAwareHybrid
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArchitectureKind::Rnn => "rnn",
            ArchitectureKind::Transformer => "transformer",
            ArchitectureKind::CharSource => "char_source",
            ArchitectureKind::CharAwareHybrid => "char_aware_hybrid",
        }
    }
}

impl FromStr for ArchitectureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rnn" => Ok(ArchitectureKind::Rnn),
            "transformer" => Ok(ArchitectureKind::Transformer),
            "char_source" => Ok(ArchitectureKind::CharSource),
            "char_aware_hybrid" => Ok(ArchitectureKind::CharAwareHybrid),
            other => Err(Error::Validation(format!(
                "unknown architecture '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporaCfg {
    pub train_source_text: PathBuf,
    pub train_target_text: PathBuf,
    pub eval_source_text: PathBuf,
    pub eval_target_text: PathBuf,
    #[serde(default)]
    pub train_mono_source_text: Option<PathBuf>,
    #[serde(default)]
    pub train_mono_target_text: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabCfg {
    pub source_vocab_file: PathBuf,
    pub target_vocab_file: PathBuf,
    #[serde(default)]
    pub source_max_size: Option<usize>,
    #[serde(default)]
    pub target_max_size: Option<usize>,
    #[serde(default)]
    pub char_source_vocab_file: Option<PathBuf>,
    #[serde(default)]
    pub char_target_vocab_file: Option<PathBuf>,
    #[serde(default)]
    pub char_source_max_size: Option<usize>,
    #[serde(default)]
    pub char_target_max_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinarizationCfg {
    pub append_eos_to_source: bool,
    pub reverse_source: bool,
}

/// Output archive locations, one slot per (corpus, side). Slots left
/// unset are derived next to the corresponding text file by the
/// orchestrator; the populated copy it returns has every produced slot
/// filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinaryPathsCfg {
    #[serde(default)]
    pub train_source: Option<PathBuf>,
    #[serde(default)]
    pub train_target: Option<PathBuf>,
    #[serde(default)]
    pub eval_source: Option<PathBuf>,
    #[serde(default)]
    pub eval_target: Option<PathBuf>,
    #[serde(default)]
    pub train_mono_source: Option<PathBuf>,
    #[serde(default)]
    pub train_mono_target: Option<PathBuf>,
}

impl PreprocessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let cfg = serde_json::from_reader(reader)?;
        Ok(cfg)
    }

    pub fn is_semi_supervised(&self) -> bool {
        self.task == TaskKind::SemiSupervised
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_from_str_roundtrip() {
        for arch in [
            ArchitectureKind::Rnn,
            ArchitectureKind::Transformer,
            ArchitectureKind::CharSource,
            ArchitectureKind::CharAwareHybrid,
        ] {
            assert_eq!(arch.name().parse::<ArchitectureKind>().unwrap(), arch);
        }
    }

    #[test]
    fn arch_from_str_rejects_unknown() {
        let err = "lstm_with_extras".parse::<ArchitectureKind>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn char_awareness_is_per_variant() {
        assert!(!ArchitectureKind::Rnn.requires_char_vocab());
        assert!(!ArchitectureKind::Transformer.requires_char_vocab());
        assert!(ArchitectureKind::CharSource.requires_char_vocab());
        assert!(ArchitectureKind::CharAwareHybrid.requires_char_vocab());
    }
}
