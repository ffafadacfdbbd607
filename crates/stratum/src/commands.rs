mod serve;

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;

pub trait Command {
    async fn execute(&self, args: &Args) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum StratumCommand {
    /// Start the LSP server
    Serve(self::serve::Serve),
}

impl Command for StratumCommand {
    async fn execute(&self, args: &Args) -> Result<ExitCode> {
        match self {
            Self::Serve(cmd) => cmd.execute(args).await,
        }
    }
}
