mod cli;
mod infra;
mod report;

use ia_exam::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
