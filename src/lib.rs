//! Backward-induction optimizer for a five-tier quality upcycling chain.
//!
//! [optimizer::full_setup] solves tier 5 in closed form and then tiers 4 down to 1,
//! each searching every productivity/quality module split for the best expected
//! quality 5 output per input. [optimizer::enumerate_setup] does the same while
//! also choosing module kinds per tier. All arithmetic is `rust_decimal`.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod optimizer;
pub mod output;
pub mod parallel;

pub use error::{ChainError, ChainResult};
