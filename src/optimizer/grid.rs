//! Fixed-module runs for every productivity × quality pair in the catalog.
//! Cells are independent, so they are solved on the Rayon pool; output order is
//! always catalog order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{ModuleCatalog, ModuleId, ModuleKind};
use crate::error::{ChainError, ChainResult};
use crate::optimizer::{full_setup, ChainSolution, RunParameters};
use crate::parallel::WorkerPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub productivity_module: ModuleId,
    /// One cell per quality module, `None` where some tier has no convergent split.
    pub cells: Vec<Option<ChainSolution>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionGrid {
    pub params: RunParameters,
    pub quality_modules: Vec<ModuleId>,
    pub rows: Vec<GridRow>,
}

impl SolutionGrid {
    pub fn cell(&self, productivity: ModuleId, quality: ModuleId) -> Option<&ChainSolution> {
        let column = self.quality_modules.iter().position(|id| *id == quality)?;
        self.rows
            .iter()
            .find(|row| row.productivity_module == productivity)?
            .cells
            .get(column)?
            .as_ref()
    }
}

fn solve_cell(
    catalog: &ModuleCatalog,
    params: &RunParameters,
    productivity: ModuleId,
    quality: ModuleId,
) -> ChainResult<Option<ChainSolution>> {
    match full_setup(catalog, params, productivity, quality) {
        Ok(solution) => Ok(Some(solution)),
        Err(ChainError::InfeasibleConfiguration { tier, .. }) => {
            warn!(%productivity, %quality, tier, "grid cell has no convergent split");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub fn solve_grid(
    catalog: &ModuleCatalog,
    params: &RunParameters,
    pool: &WorkerPool,
) -> ChainResult<SolutionGrid> {
    let productivity_modules = catalog.ids(ModuleKind::Productivity);
    let quality_modules = catalog.ids(ModuleKind::Quality);

    let rows = pool.install(|| {
        productivity_modules
            .par_iter()
            .map(|productivity| -> ChainResult<GridRow> {
                let cells = quality_modules
                    .par_iter()
                    .map(|quality| solve_cell(catalog, params, *productivity, *quality))
                    .collect::<ChainResult<Vec<_>>>()?;
                Ok(GridRow {
                    productivity_module: *productivity,
                    cells,
                })
            })
            .collect::<ChainResult<Vec<_>>>()
    })??;

    info!(
        rows = rows.len(),
        columns = quality_modules.len(),
        slots = params.slots,
        "grid solved"
    );

    Ok(SolutionGrid {
        params: *params,
        quality_modules,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn grid_covers_catalog_in_order() {
        let catalog = ModuleCatalog::standard();
        let params = RunParameters::new(2, Decimal::ONE).unwrap();
        let grid = solve_grid(&catalog, &params, &WorkerPool::with_workers(2)).unwrap();

        assert_eq!(grid.rows.len(), 16);
        assert_eq!(grid.quality_modules, catalog.ids(ModuleKind::Quality));
        assert_eq!(grid.rows[0].productivity_module, ModuleId::NONE);
        assert!(grid.rows.iter().all(|row| row.cells.len() == 15));
        assert!(grid.rows.iter().flat_map(|row| &row.cells).all(Option::is_some));
    }

    #[test]
    fn grid_cell_matches_direct_solve() {
        let catalog = ModuleCatalog::standard();
        let params = RunParameters::new(4, Decimal::ONE).unwrap();
        let grid = solve_grid(&catalog, &params, &WorkerPool::default()).unwrap();
        let best = ModuleId::new(3, 5);
        let direct = full_setup(&catalog, &params, best, best).unwrap();
        assert_eq!(grid.cell(best, best), Some(&direct));
    }

    #[test]
    fn infeasible_cells_are_left_empty() {
        let catalog = ModuleCatalog::standard();
        let params = RunParameters::new(1, Decimal::from(5)).unwrap();
        let grid = solve_grid(&catalog, &params, &WorkerPool::default()).unwrap();
        assert!(grid.cell(ModuleId::new(1, 1), ModuleId::new(1, 1)).is_none());
    }
}
