//! Read-only bonus tables for productivity and quality modules.
//!
//! The catalog is built once and handed to the optimizer by reference. Entry order
//! is insertion order and fixes the row/column order of every emitted table.

pub mod module_id;

pub use module_id::{ModuleId, ModuleKind, ParseModuleIdError, MAX_MODULE_QUALITY, MAX_MODULE_TIER};

use rust_decimal::Decimal;

use crate::error::{ChainError, ChainResult};

/// Productivity bonus per module, tier-major, quality levels 1..=5 (scale 2).
const PRODUCTIVITY_BONUS_HUNDREDTHS: [[i64; 5]; 3] = [
    [4, 5, 6, 7, 10],
    [6, 7, 9, 11, 15],
    [10, 13, 16, 19, 25],
];

/// Quality bonus per module, tier-major, quality levels 1..=5 (scale 3).
const QUALITY_BONUS_THOUSANDTHS: [[i64; 5]; 3] = [
    [10, 13, 16, 19, 25],
    [20, 26, 32, 38, 50],
    [25, 32, 40, 47, 62],
];

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCatalog {
    productivity: Vec<(ModuleId, Decimal)>,
    quality: Vec<(ModuleId, Decimal)>,
}

impl ModuleCatalog {
    /// Build a catalog from explicit entries. Later duplicates of an id are ignored.
    pub fn from_entries(
        productivity: impl IntoIterator<Item = (ModuleId, Decimal)>,
        quality: impl IntoIterator<Item = (ModuleId, Decimal)>,
    ) -> Self {
        fn dedup(entries: impl IntoIterator<Item = (ModuleId, Decimal)>) -> Vec<(ModuleId, Decimal)> {
            let mut out: Vec<(ModuleId, Decimal)> = Vec::new();
            for (id, bonus) in entries {
                if !out.iter().any(|(existing, _)| *existing == id) {
                    out.push((id, bonus));
                }
            }
            out
        }
        Self {
            productivity: dedup(productivity),
            quality: dedup(quality),
        }
    }

    /// The in-game module tables, plus `T0Q0` (zero productivity) for recipes that
    /// refuse productivity modules.
    pub fn standard() -> Self {
        let grid = |table: &[[i64; 5]; 3], scale: u32| {
            table
                .iter()
                .enumerate()
                .flat_map(move |(tier_idx, row)| {
                    row.iter().enumerate().map(move |(quality_idx, raw)| {
                        (
                            ModuleId::new(tier_idx as u8 + 1, quality_idx as u8 + 1),
                            Decimal::new(*raw, scale),
                        )
                    })
                })
                .collect::<Vec<_>>()
        };

        let mut productivity = vec![(ModuleId::NONE, Decimal::ZERO)];
        productivity.extend(grid(&PRODUCTIVITY_BONUS_HUNDREDTHS, 2));
        Self::from_entries(productivity, grid(&QUALITY_BONUS_THOUSANDTHS, 3))
    }

    pub fn bonus(&self, kind: ModuleKind, id: ModuleId) -> ChainResult<Decimal> {
        self.entries(kind)
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, bonus)| *bonus)
            .ok_or_else(|| ChainError::UnknownModuleIdentifier {
                id: id.to_string(),
                kind,
            })
    }

    pub fn productivity(&self, id: ModuleId) -> ChainResult<Decimal> {
        self.bonus(ModuleKind::Productivity, id)
    }

    pub fn quality(&self, id: ModuleId) -> ChainResult<Decimal> {
        self.bonus(ModuleKind::Quality, id)
    }

    /// Parse and resolve an identifier in one step, reporting the raw text on failure.
    pub fn resolve(&self, kind: ModuleKind, raw: &str) -> ChainResult<(ModuleId, Decimal)> {
        let id: ModuleId = raw.parse().map_err(|_| ChainError::UnknownModuleIdentifier {
            id: raw.to_string(),
            kind,
        })?;
        Ok((id, self.bonus(kind, id)?))
    }

    pub fn entries(&self, kind: ModuleKind) -> &[(ModuleId, Decimal)] {
        match kind {
            ModuleKind::Productivity => &self.productivity,
            ModuleKind::Quality => &self.quality,
        }
    }

    pub fn ids(&self, kind: ModuleKind) -> Vec<ModuleId> {
        self.entries(kind).iter().map(|(id, _)| *id).collect()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
