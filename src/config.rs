//! Batch run configuration: which machines to tabulate and where results land.
//! Loaded from YAML or JSON; the built-in machine presets apply when no file is given.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, ChainResult};
use crate::optimizer::RunParameters;

pub const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    pub name: String,
    pub slots: u32,
    pub base_productivity: Decimal,
    /// Output lands in `results_<suffix>.csv`.
    pub suffix: String,
}

impl RunSpec {
    pub fn parameters(&self) -> ChainResult<RunParameters> {
        RunParameters::new(self.slots, self.base_productivity)
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("results_{}.csv", self.suffix))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub runs: Vec<RunSpec>,
}

impl RunConfig {
    /// Assembling machines 1/2 (2 slots), assembling machine 3 (4 slots) and the
    /// electromagnetic plant (5 slots, 50% base productivity).
    pub fn presets() -> Self {
        let preset = |name: &str, slots, base_productivity, suffix: &str| RunSpec {
            name: name.to_string(),
            slots,
            base_productivity,
            suffix: suffix.to_string(),
        };
        Self {
            runs: vec![
                preset("assembler-2", 2, Decimal::ONE, "a2"),
                preset("assembler-3", 4, Decimal::ONE, "a3"),
                preset("em-plant", 5, Decimal::new(15, 1), "ep"),
            ],
        }
    }

    pub fn preset(name: &str) -> Option<RunSpec> {
        Self::presets().runs.into_iter().find(|run| run.name == name)
    }

    pub fn from_yaml_str(raw: &str) -> ChainResult<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> ChainResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON for `.json` files, YAML for everything else.
    pub fn load(path: &Path) -> ChainResult<Self> {
        let raw = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_yaml_str(&raw)
        }
    }

    pub fn validate(&self) -> ChainResult<()> {
        if self.runs.is_empty() {
            return Err(ChainError::InvalidConfig {
                reason: "no runs configured".to_string(),
            });
        }
        let mut suffixes = HashSet::new();
        for run in &self.runs {
            if run.suffix.trim().is_empty() {
                return Err(ChainError::InvalidConfig {
                    reason: format!("run '{}' has an empty suffix", run.name),
                });
            }
            if !suffixes.insert(run.suffix.as_str()) {
                return Err(ChainError::InvalidConfig {
                    reason: format!("duplicate suffix '{}'", run.suffix),
                });
            }
            run.parameters()?;
        }
        Ok(())
    }
}
