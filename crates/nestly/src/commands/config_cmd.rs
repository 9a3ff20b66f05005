//! Config subcommand handlers.

use super::Context;
use crate::cli::{ConfigArgs, ConfigCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    let rendered = match args.command {
        ConfigCommand::Path => ctx.config_path.display().to_string(),
        ConfigCommand::Show if ctx.format == OutputFormat::Json => {
            output::render_json_pretty(&ctx.config)
        }
        ConfigCommand::Show => toml::to_string_pretty(&ctx.config)
            .map_err(|e| CliError::Config(e.into()))?
            .trim_end()
            .to_owned(),
    };
    output::print_output(&rendered);
    Ok(())
}
