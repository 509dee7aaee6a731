//! Contract Policy CLI
//!
//! Command-line interface for checking OpenAPI/Swagger contracts against a
//! project policy.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use contract_policy::{
    load_contract_auto, ConformanceChecker, ConformanceOutcome, Contract, MetaSchemaChecker,
    PolicyReport, PolicyValidator, RuleSet,
};

#[derive(Parser)]
#[command(name = "contract-policy")]
#[command(about = "Check OpenAPI/Swagger contracts against project policy rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a contract against a policy rule file
    Check {
        /// Contract source: .json/.yaml/.yml file path or URL
        contract: String,

        /// Policy rule file (JSON): file path or URL
        #[arg(long, short)]
        rules: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also check conformance against this JSON Schema
        #[arg(long)]
        meta_schema: Option<PathBuf>,
    },

    /// Check a contract against an OpenAPI meta-schema only
    Conform {
        /// Contract source: .json/.yaml/.yml file path or URL
        contract: String,

        /// OpenAPI/Swagger meta-schema (JSON Schema file)
        #[arg(long)]
        meta_schema: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr so reports on stdout stay parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            contract,
            rules,
            format,
            meta_schema,
        } => run_check(&contract, &rules, format, meta_schema.as_deref()),

        Commands::Conform {
            contract,
            meta_schema,
            format,
        } => run_conform(&contract, &meta_schema, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_check(
    contract_source: &str,
    rules_source: &str,
    format: OutputFormat,
    meta_schema: Option<&Path>,
) -> Result<(), u8> {
    // Rules first: a broken policy aborts before the contract is touched
    let rules = RuleSet::load_auto(rules_source).map_err(|e| {
        eprintln!("Error loading rules: {}", e);
        e.exit_code() as u8
    })?;
    let validator = PolicyValidator::new(&rules).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let contract = load_contract(contract_source)?;

    let conformance = match meta_schema {
        Some(path) => Some(check_conformance(&contract, path)?),
        None => None,
    };

    let report = validator.validate(&contract);
    let passed = report.compliant && conformance.as_ref().map_or(true, |c| c.passed);

    match format {
        OutputFormat::Json => {
            let mut output = serde_json::json!({
                "compliant": report.compliant,
                "violations": report.violations,
            });
            if let Some(conformance) = &conformance {
                output["conformance"] = serde_json::json!({
                    "passed": conformance.passed,
                    "errors": conformance.errors,
                });
            }
            print_json(&output)?;
        }
        OutputFormat::Text => {
            if let Some(conformance) = &conformance {
                println!("{}\n", conformance_text(conformance));
            }
            println!("{}", report_text(&report));
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_conform(contract_source: &str, meta_schema: &Path, format: OutputFormat) -> Result<(), u8> {
    let contract = load_contract(contract_source)?;
    let outcome = check_conformance(&contract, meta_schema)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "passed": outcome.passed,
            "errors": outcome.errors,
        }))?,
        OutputFormat::Text => println!("{}", conformance_text(&outcome)),
    }

    if outcome.passed {
        Ok(())
    } else {
        Err(1)
    }
}

fn load_contract(source: &str) -> Result<Contract, u8> {
    load_contract_auto(source).map_err(|e| {
        eprintln!("Error loading contract: {}", e);
        e.exit_code() as u8
    })
}

fn check_conformance(contract: &Contract, meta_schema: &Path) -> Result<ConformanceOutcome, u8> {
    let checker = MetaSchemaChecker::load(meta_schema).map_err(|e| {
        eprintln!("Error loading meta-schema: {}", e);
        e.exit_code() as u8
    })?;
    Ok(checker.check(&contract.document).annotated(&contract.text))
}

fn print_json(value: &serde_json::Value) -> Result<(), u8> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", output);
    Ok(())
}

// Entries are separated by a blank line; a single entry may span lines.
fn report_text(report: &PolicyReport) -> String {
    if report.compliant {
        return report.message();
    }
    report
        .violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn conformance_text(outcome: &ConformanceOutcome) -> String {
    if outcome.passed {
        return outcome.message();
    }
    outcome.errors.join("\n\n")
}
