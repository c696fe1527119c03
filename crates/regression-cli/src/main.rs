//! h2spec-regression CLI
//!
//! Compares a pull request's h2spec reports against the reference summaries
//! recorded on the main branch, and records those summaries in the first
//! place.
//!
//! ## Commands
//!
//! - `compare`: compare local reports with reference check runs, report the
//!   verdict as a PR comment and an `h2spec-regression` check run
//! - `summarize`: print (and optionally publish) each suite's summary
//!   sentence so later runs can compare against it
//!
//! Exit code 0 means no regression; anything else is a regression or an
//! error.

mod event;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use regression_core::{
    compare_suites, init_tracing, parse_suite_list, publish_report, publish_summaries,
    summarize_suites, MissingReferencePolicy, PublishTarget, ReportLocator, RunOutcome,
    SuiteSummary, Verdict, DEFAULT_CHECK_NAME,
};
use regression_github::GithubClient;
use serde::Serialize;
use tracing::{error, info, warn, Level};

use crate::event::PullRequestContext;

#[derive(Parser)]
#[command(name = "h2spec-regression")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect h2spec regressions against main-branch reference results", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare local reports with the reference check runs
    Compare(CompareArgs),

    /// Print each suite's summary sentence, optionally publishing it as a
    /// check run named after the suite
    Summarize(SummarizeArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Suites to process (comma-separated)
    #[arg(short, long, env = "H2SPEC_SUITES")]
    suites: String,

    /// Directory holding the per-suite reports
    #[arg(long, env = "H2SPEC_REPORT_DIR", default_value = ".")]
    report_dir: PathBuf,

    /// Report file name; `{suite}` is replaced with the suite name
    #[arg(long, env = "H2SPEC_REPORT_PATTERN", default_value = ReportLocator::DEFAULT_PATTERN)]
    report_pattern: String,
}

impl ReportArgs {
    fn resolve(&self) -> Result<(Vec<String>, ReportLocator)> {
        let suites = parse_suite_list(&self.suites)?;
        let locator = ReportLocator::new(&self.report_dir, self.report_pattern.as_str())?;
        Ok((suites, locator))
    }
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    reports: ReportArgs,

    /// Ref whose check runs hold the reference summaries
    #[arg(long, env = "H2SPEC_REFERENCE_REF", default_value = "main")]
    reference_ref: String,

    /// What to do when a suite has no reference check run (skip-success, fail)
    #[arg(long, env = "H2SPEC_ON_MISSING_REFERENCE", default_value = "skip-success")]
    on_missing_reference: MissingReferencePolicy,

    /// Name of the check run carrying the verdict
    #[arg(long, env = "H2SPEC_CHECK_NAME", default_value = DEFAULT_CHECK_NAME)]
    check_name: String,

    /// Commit to attach the verdict check run to (defaults to the PR head,
    /// then GITHUB_SHA)
    #[arg(long)]
    head_sha: Option<String>,

    /// Pull request to comment on (defaults to the triggering PR)
    #[arg(long, env = "H2SPEC_PR_NUMBER")]
    pr_number: Option<u64>,

    /// Print the verdict without commenting or creating a check run
    #[arg(long)]
    no_publish: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct SummarizeArgs {
    #[command(flatten)]
    reports: ReportArgs,

    /// Commit to attach the summary check runs to
    #[arg(long, env = "GITHUB_SHA")]
    head_sha: Option<String>,

    /// Publish one check run per suite
    #[arg(long)]
    publish: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum CompareOutput<'a> {
    Completed {
        regression: bool,
        verdicts: &'a [Verdict],
    },
    ReferenceMissing {
        suite: &'a str,
        policy: MissingReferencePolicy,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Compare(args) => cmd_compare(args).await,
        Commands::Summarize(args) => cmd_summarize(args).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Compare every suite and publish the verdict. Returns whether the run
/// succeeded.
async fn cmd_compare(args: CompareArgs) -> Result<bool> {
    let (suites, locator) = args.reports.resolve()?;
    let client = GithubClient::from_env().context("Failed to configure GitHub client")?;

    info!(
        suites = %suites.join(","),
        reference_ref = %args.reference_ref,
        policy = %args.on_missing_reference,
        "Comparing suites"
    );

    let outcome = compare_suites(
        &suites,
        &locator,
        &client,
        &args.reference_ref,
        args.on_missing_reference,
    )
    .await
    .context("Comparison aborted")?;

    print_compare_output(&outcome, args.format)?;

    let report = match &outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::ReferenceMissing { suite, policy } => {
            warn!(
                "No reference check run for '{}' on {}; stopping ({})",
                suite, args.reference_ref, policy
            );
            return Ok(outcome.is_success());
        }
    };

    if args.no_publish {
        info!("Publishing disabled");
    } else {
        let pr = PullRequestContext::from_env()?;
        let target = PublishTarget::new(
            args.pr_number.or(pr.as_ref().map(|p| p.number)),
            args.head_sha
                .or(pr.map(|p| p.head_sha))
                .or_else(|| std::env::var("GITHUB_SHA").ok()),
        )
        .with_check_name(args.check_name);

        publish_report(&client, &target, report)
            .await
            .context("Failed to publish comparison report")?;
    }

    if report.regression() {
        warn!("Regression detected");
    } else {
        info!("No regression");
    }

    Ok(outcome.is_success())
}

/// Print summaries for every suite, publishing them when asked. Returns
/// `true` unless an error occurs.
async fn cmd_summarize(args: SummarizeArgs) -> Result<bool> {
    let (suites, locator) = args.reports.resolve()?;
    let summaries = summarize_suites(&suites, &locator)?;

    print_summaries(&summaries, args.format)?;

    if args.publish {
        let head_sha = args
            .head_sha
            .context("--publish requires --head-sha or GITHUB_SHA")?;
        let client = GithubClient::from_env().context("Failed to configure GitHub client")?;
        publish_summaries(&client, &head_sha, &summaries)
            .await
            .context("Failed to publish summaries")?;
        info!(head_sha = %head_sha, suites = summaries.len(), "Published reference summaries");
    }

    Ok(true)
}

fn print_compare_output(outcome: &RunOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if let Some(report) = outcome.report() {
                println!("{}", report.body());
            }
        }
        OutputFormat::Json => {
            let output = match outcome {
                RunOutcome::Completed(report) => CompareOutput::Completed {
                    regression: report.regression(),
                    verdicts: &report.verdicts,
                },
                RunOutcome::ReferenceMissing { suite, policy } => {
                    CompareOutput::ReferenceMissing {
                        suite,
                        policy: *policy,
                    }
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_summaries(summaries: &[SuiteSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for summary in summaries {
                println!("{}: {}", summary.suite, summary.sentence);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summaries)?),
    }
    Ok(())
}
