//! Text and CSV renderings of optimizer results.

pub mod format;
pub mod table;

pub use format::{format_solution, format_tier, INFEASIBLE_CELL};
pub use table::{write_candidate_csv, write_grid_csv, CandidateRow, GRID_CORNER_HEADER};
