//! CSV tables: the productivity × quality grid and the per-tier candidate table.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::ModuleId;
use crate::error::ChainResult;
use crate::optimizer::{CandidateRecord, SolutionGrid};
use crate::output::format::{format_solution, INFEASIBLE_CELL};

pub const GRID_CORNER_HEADER: &str = "Prod\\Qual";

/// Header row of quality ids, then one row per productivity module whose cells
/// hold the five formatted tier lines.
pub fn write_grid_csv<W: Write>(grid: &SolutionGrid, writer: W) -> ChainResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![GRID_CORNER_HEADER.to_string()];
    header.extend(grid.quality_modules.iter().map(ModuleId::to_string));
    csv.write_record(&header)?;

    for row in &grid.rows {
        let mut record = vec![row.productivity_module.to_string()];
        record.extend(row.cells.iter().map(|cell| match cell {
            Some(solution) => format_solution(&solution.tiers),
            None => INFEASIBLE_CELL.to_string(),
        }));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Flat row of the enumerate-mode candidate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub tier: u8,
    pub productivity: ModuleId,
    pub quality: Option<ModuleId>,
    pub productivity_modules: Option<u32>,
    pub quality_modules: Option<u32>,
    pub expected_output: Option<Decimal>,
    pub selected: bool,
}

impl From<&CandidateRecord> for CandidateRow {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            tier: record.tier,
            productivity: record.productivity_module,
            quality: record.quality_module,
            productivity_modules: record.outcome.map(|o| o.productivity_modules),
            quality_modules: record.outcome.map(|o| o.quality_modules),
            expected_output: record.outcome.map(|o| o.value),
            selected: record.selected,
        }
    }
}

pub fn write_candidate_csv<W: Write>(records: &[CandidateRecord], writer: W) -> ChainResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(CandidateRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleCatalog;
    use crate::optimizer::{enumerate_setup, solve_grid, CandidateSet, RunParameters};
    use crate::parallel::WorkerPool;

    #[test]
    fn grid_csv_has_header_and_one_row_per_productivity_module() {
        let catalog = ModuleCatalog::standard();
        let params = RunParameters::new(2, Decimal::ONE).unwrap();
        let grid = solve_grid(&catalog, &params, &WorkerPool::default()).unwrap();

        let mut buffer = Vec::new();
        write_grid_csv(&grid, &mut buffer).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], GRID_CORNER_HEADER);
        assert_eq!(&headers[1], "T1Q1");
        assert_eq!(headers.len(), 16);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 16);
        assert_eq!(&rows[0][0], "T0Q0");
        assert_eq!(rows[1][1].lines().count(), 5);
        assert!(rows[1][1].lines().last().unwrap().starts_with("[P:2 Q:0] | E_out:1.08"));
    }

    #[test]
    fn candidate_csv_leaves_infeasible_cells_empty() {
        let catalog = ModuleCatalog::standard();
        let params = RunParameters::new(2, Decimal::from(6)).unwrap();
        let candidates = CandidateSet::new(
            vec![ModuleId::new(1, 1)],
            vec![ModuleId::new(1, 1), ModuleId::new(3, 5)],
        );
        let solution = enumerate_setup(&catalog, &params, &candidates).unwrap();

        let mut buffer = Vec::new();
        write_candidate_csv(&solution.records, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("tier,productivity,quality,productivity_modules,quality_modules,expected_output,selected")
        );
        assert!(text.contains("4,T1Q1,T1Q1,,,,false"));
        assert!(text.contains("4,T1Q1,T3Q5,0,2,"));
    }
}
