//! Command-line tool for form definition files.
//!
//! - `check`: report layout and naming problems in a stored form
//! - `normalize`: migrate legacy fields and repair layouts
//! - `fill`: validate an answer file against a form and optionally submit it

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formgrid_core::config::FormConfig;
use formgrid_core::interchange::{load_form, normalize_definition, save_form};
use formgrid_core::schema::validation::check_definition;
use formgrid_runtime::{AnswerMap, FormSession, Mode, NavOutcome, SubmitHandler, SubmitStatus};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Row limit for repeater sections stored without config
    #[arg(long, global = true, default_value_t = FormConfig::default().default_repeater_max_rows)]
    max_rows: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report layout and naming problems; exits with 1 if any
    Check {
        /// Form definition file
        form: PathBuf,
    },

    /// Migrate legacy fields, resolve overlaps and compact rows
    Normalize {
        /// Form definition file
        form: PathBuf,

        /// Output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate answers against every page and print the error map
    Fill {
        /// Form definition file
        form: PathBuf,

        /// Answer map file
        answers: PathBuf,

        /// Print the submitted answers when they validate
        #[arg(long)]
        submit: bool,
    },
}

/// Submit collaborator writing the answers to stdout.
struct PrintAnswers;

#[async_trait]
impl SubmitHandler for PrintAnswers {
    async fn submit(&self, answers: AnswerMap) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&answers)?);
        Ok(())
    }
}

fn check(form: PathBuf) -> anyhow::Result<ExitCode> {
    let definition = load_form(&form).with_context(|| format!("Failed to load {}", form.display()))?;
    let problems = check_definition(&definition);
    if problems.is_empty() {
        println!("{}: ok", form.display());
        return Ok(ExitCode::SUCCESS);
    }
    for problem in &problems {
        println!("{}: {}", form.display(), problem);
    }
    tracing::warn!("{} problem(s) found in {}", problems.len(), form.display());
    Ok(ExitCode::from(1))
}

fn normalize(form: PathBuf, output: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut definition =
        load_form(&form).with_context(|| format!("Failed to load {}", form.display()))?;
    let report = normalize_definition(&mut definition);
    let target = output.unwrap_or_else(|| form.clone());
    save_form(&target, &definition)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!(
        "{}: migrated {}, shifted {}, renamed {}, compacted {}",
        target.display(),
        report.migrated,
        report.shifted,
        report.renamed,
        report.compacted
    );
    Ok(ExitCode::SUCCESS)
}

async fn fill(
    form: PathBuf,
    answers: PathBuf,
    submit: bool,
    config: FormConfig,
) -> anyhow::Result<ExitCode> {
    let definition = load_form(&form).with_context(|| format!("Failed to load {}", form.display()))?;
    let raw = std::fs::read_to_string(&answers)
        .with_context(|| format!("Failed to read {}", answers.display()))?;
    let answers: AnswerMap = serde_json::from_str(&raw)
        .with_context(|| format!("Answers in {} are not a JSON object", answers.display()))?;

    let mut session = FormSession::new(definition, answers, Mode::Edit, Arc::new(PrintAnswers))
        .with_config(config);
    let (errors, first_page) = session.all_errors();
    if let Some(page) = first_page {
        tracing::warn!("{} error(s), first on page {}", errors.len(), page);
        println!("{}", serde_json::to_string_pretty(&errors)?);
        return Ok(ExitCode::from(1));
    }
    if !submit {
        println!("{}", serde_json::to_string_pretty(&errors)?);
        return Ok(ExitCode::SUCCESS);
    }

    while !session.is_last_page() {
        if !matches!(session.next()?, NavOutcome::Moved { .. }) {
            break;
        }
    }
    match session.submit().await? {
        SubmitStatus::Submitted => Ok(ExitCode::SUCCESS),
        SubmitStatus::Invalid { page, errors } => {
            tracing::error!("Submit failed with {} error(s) on page {}", errors, page);
            Ok(ExitCode::from(1))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FormConfig {
        default_repeater_max_rows: cli.max_rows,
        ..FormConfig::default()
    };

    let result = match cli.command {
        Commands::Check { form } => check(form),
        Commands::Normalize { form, output } => normalize(form, output),
        Commands::Fill {
            form,
            answers,
            submit,
        } => fill(form, answers, submit, config).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
