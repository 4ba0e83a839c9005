//! Repository chores that plain `cargo` cannot express, run as
//! `cargo run -p xtask -- <command>` (the cargo-xtask convention).

use clap::Parser;

mod dynamodb;
mod prelude;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "campusboard repository chores")]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

/// Output switches shared by every command.
#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Print nothing but errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    /// Also print the target endpoint and table
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Plan, create or delete the forum's DynamoDB table
    Dynamodb(dynamodb::DynamodbCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { global, command } = Cli::parse();

    match command {
        Commands::Dynamodb(cmd) => dynamodb::run(cmd, global).await?,
    }

    Ok(())
}
