use std::env;
use std::process::ExitCode;

use quality_chain::cli::run_with_args;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match run_with_args(&args) {
        0 => ExitCode::SUCCESS,
        code => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    }
}
