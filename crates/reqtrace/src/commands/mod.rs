pub(crate) mod generate;
pub(crate) mod init;

use anyhow::Result;
use reqtrace_config as cli;

pub(crate) fn dispatch(cli: cli::Cli) -> Result<()> {
    match cli
        .command
        .unwrap_or(cli::Commands::Generate(cli.generate.clone()))
    {
        cli::Commands::Generate(args) => generate::handle(&args),
        cli::Commands::Init(args) => init::handle(&args),
    }
}
