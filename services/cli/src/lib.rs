mod cli;
mod output;
mod prompt;

use hiring_funnel::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
