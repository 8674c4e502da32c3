use ratechart_core::expand;

use crate::cli::RangeArgs;
use crate::error::CliError;

use super::{Context, Report};

pub fn run(args: &RangeArgs, context: &Context) -> Result<Report, CliError> {
    let (start, end) = context.range(args)?;
    Ok(Report::Dates(expand(start, end)))
}
