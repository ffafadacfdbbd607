use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use stratum_workspace::NullLanguageServiceFactory;

use crate::args::Args;
use crate::commands::Command;

#[derive(Debug, Parser)]
pub struct Serve {
    #[arg(short, long, default_value_t = ConnectionType::Stdio, value_enum)]
    connection_type: ConnectionType,
}

#[derive(Clone, Debug, ValueEnum)]
enum ConnectionType {
    Stdio,
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
        }
    }
}

impl Command for Serve {
    async fn execute(&self, _args: &Args) -> Result<ExitCode> {
        stratum_server::serve(Arc::new(NullLanguageServiceFactory)).await?;
        Ok(ExitCode::SUCCESS)
    }
}
