//! `cargo xtask dynamodb ...`: manage the forum's single DynamoDB table.
//!
//! Every action first describes the live table, turns that into a plan with
//! the pure functions in [`planning`], and only then touches AWS.

mod client;
mod config;
mod deploy;
mod error;
mod planning;

pub use error::{DynamodbError, Result};

use crate::prelude::*;
use crate::Global;
use dialoguer::Confirm;
use planning::{DeployPlan, DestroyPlan};

#[derive(Debug, clap::Parser)]
#[command(after_help = "The table uses PK (hash) and SK (range) string keys, pay-per-request
billing and no secondary indexes. Point AWS_ENDPOINT_URL at DynamoDB Local
to work offline; AWS_REGION and AWS_PROFILE are honoured as usual.")]
pub struct DynamodbCommand {
    /// Table to manage; matches the service's DYNAMODB_TABLE_NAME.
    #[arg(long, global = true, env = "DYNAMODB_TABLE_NAME", default_value = "campusboard")]
    pub table_name: String,

    /// Apply without asking for confirmation.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub action: DynamodbAction,
}

#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Show what `deploy` would do without changing anything.
    Plan,
    /// Create the table if it is missing.
    Deploy,
    /// Delete the table and every record in it.
    Destroy,
}

/// Prints plan output unless `--silent` was given.
struct Report<'a> {
    global: &'a Global,
}

impl Report<'_> {
    fn heading(&self, text: &str) {
        if !self.global.is_silent() {
            aprintln!("{}", p_c(text));
        }
    }

    fn lines(&self, lines: &[String]) {
        if self.global.is_silent() {
            return;
        }
        for line in lines {
            let painted = match line.chars().next() {
                Some('+') => p_g(line),
                Some('-') | Some('!') => p_r(line),
                _ => line.clone(),
            };
            aprintln!("  {}", painted);
        }
        aprintln!();
    }

    fn done(&self, text: &str) {
        if !self.global.is_silent() {
            aprintln!("{}", p_g(text));
        }
    }

    fn detail(&self, label: &str, value: &str) {
        if self.global.is_verbose() {
            aprintln!("{} {}", p_b(label), value);
        }
    }
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

pub async fn run(command: DynamodbCommand, global: Global) -> Result<()> {
    let report = Report { global: &global };
    let aws = client::AwsConfig::default();
    report.detail("Target:", &aws.target_display());
    report.detail("Table:", &command.table_name);

    let dynamo = client::create_client(&aws).await;
    let current = client::get_table_state(&dynamo, &command.table_name).await?;

    match command.action {
        DynamodbAction::Plan | DynamodbAction::Deploy => {
            let desired = config::campusboard_table_config().with_table_name(&command.table_name);
            let plan = planning::calculate_deploy_plan(current.as_ref(), &desired);
            report.heading("Deploy plan:");
            report.lines(&planning::format_deploy_plan(&plan));

            if matches!(command.action, DynamodbAction::Plan) {
                return Ok(());
            }
            match &plan {
                DeployPlan::NoChanges { .. } => {
                    report.done("Nothing to do.");
                    return Ok(());
                }
                DeployPlan::CreateTable { .. } if !command.yes => {
                    confirm("Create this table?", true)?;
                }
                _ => {}
            }
            deploy::execute_deploy_plan(&dynamo, &plan).await?;
            report.done("Table is active.");
        }
        DynamodbAction::Destroy => {
            let plan = planning::calculate_destroy_plan(current.as_ref(), &command.table_name);
            report.heading("Destroy plan:");
            report.lines(&planning::format_destroy_plan(&plan));

            if matches!(plan, DestroyPlan::AlreadyGone { .. }) {
                report.done("Nothing to do.");
                return Ok(());
            }
            if !command.yes {
                confirm("Delete this table and ALL of its records?", false)?;
            }
            deploy::execute_destroy_plan(&dynamo, &plan).await?;
            report.done("Table deleted.");
        }
    }

    Ok(())
}
