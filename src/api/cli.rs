use clap::{Args, Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use super::{AppState, build_calculate_response, parse_entry_token, run_http_server};
use crate::config::AppConfig;
use crate::core::{
    CalculationTrace, CommitteeType, EntryDraft, RegulationAddition, calculate_with_trace,
};
use crate::error::AppError;
use crate::store::{EntryStore, InMemoryEntryStore};
use crate::telemetry;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCommitteeType {
    WorkInjury,
    IncomeTax,
    GeneralDisability,
    SpecialServices,
    HostilityVictims,
}

impl From<CliCommitteeType> for CommitteeType {
    fn from(value: CliCommitteeType) -> Self {
        match value {
            CliCommitteeType::WorkInjury => CommitteeType::WorkInjury,
            CliCommitteeType::IncomeTax => CommitteeType::IncomeTax,
            CliCommitteeType::GeneralDisability => CommitteeType::GeneralDisability,
            CliCommitteeType::SpecialServices => CommitteeType::SpecialServices,
            CliCommitteeType::HostilityVictims => CommitteeType::HostilityVictims,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRegulationAddition {
    None,
    #[value(name = "1/4", alias = "quarter")]
    Quarter,
    #[value(name = "1/3", alias = "third")]
    Third,
    #[value(name = "1/2", alias = "half")]
    Half,
}

impl From<CliRegulationAddition> for RegulationAddition {
    fn from(value: CliRegulationAddition) -> Self {
        match value {
            CliRegulationAddition::None => RegulationAddition::None,
            CliRegulationAddition::Quarter => RegulationAddition::Quarter,
            CliRegulationAddition::Third => RegulationAddition::Third,
            CliRegulationAddition::Half => RegulationAddition::Half,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "disability-calc",
    about = "Weighted disability percentage calculator (diminishing capacity, Regulation 15)",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine disability entries into a weighted percentage
    Calculate(CalculateArgs),
    /// Start the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CalculateArgs {
    #[arg(long, value_enum, help = "Medical committee whose rules apply")]
    committee: CliCommitteeType,
    #[arg(
        long,
        value_enum,
        default_value = "none",
        help = "Regulation 15 addition; only work-injury committees apply it"
    )]
    regulation_addition: CliRegulationAddition,
    #[arg(
        long = "entry",
        required = true,
        value_parser = parse_entry_arg,
        help = "Disability entry as PERCENT or PERCENT:PRIOR, repeatable"
    )]
    entries: Vec<EntryDraft>,
    #[arg(long, help = "Print the result as JSON")]
    json: bool,
    #[arg(long, help = "Include the per-entry weighting steps")]
    steps: bool,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

fn parse_entry_arg(raw: &str) -> Result<EntryDraft, String> {
    parse_entry_token(raw).map_err(|e| e.to_string())
}

pub async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Calculate(args) => {
            let output = run_calculate(args)?;
            println!("{output}");
            Ok(())
        }
        Command::Serve(args) => run_serve(args).await,
    }
}

fn run_calculate(args: CalculateArgs) -> Result<String, AppError> {
    let store = InMemoryEntryStore::default();
    for draft in args.entries {
        store.add(draft)?;
    }
    let entries = store.list()?;

    let trace = calculate_with_trace(
        &entries,
        args.committee.into(),
        args.regulation_addition.into(),
    );

    if args.json {
        let response = build_calculate_response(trace, args.steps);
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(render_report(&trace, args.steps))
    }
}

async fn run_serve(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let addr = config.server.socket_addr()?;
    let state = AppState::new(Arc::new(InMemoryEntryStore::default()));
    tracing::info!(%addr, "starting disability calculator");
    run_http_server(addr, state).await
}

fn render_report(trace: &CalculationTrace, include_steps: bool) -> String {
    let policy = trace.committee_type.policy();
    let mut lines = vec![format!("Committee: {} ({})", trace.committee_type, policy.label)];
    if trace.applied_addition != RegulationAddition::None {
        lines.push(format!("Regulation 15 addition: {}", trace.applied_addition));
    }

    if include_steps {
        lines.push("Steps (largest net disability first):".to_string());
        lines.extend(trace.steps.iter().enumerate().map(|(index, step)| {
            format!(
                "  {}. entry {}: net {}% -> +{:.2}% (remaining capacity {:.2}%)",
                index + 1,
                step.entry_id,
                step.actual_disability,
                step.weighted_addition,
                step.remaining_capacity
            )
        }));
    }

    lines.push(format!("Intermediate (arithmetic): {}%", trace.result.intermediate));
    lines.push(format!(
        "Final weighted disability: {}%",
        trace.result.final_disability
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    fn calculate_args(args: &[&str]) -> CalculateArgs {
        match parse(args).command {
            Command::Calculate(args) => args,
            Command::Serve(_) => panic!("expected calculate subcommand"),
        }
    }

    #[test]
    fn parses_entries_with_prior_conditions() {
        let args = calculate_args(&[
            "disability-calc",
            "calculate",
            "--committee",
            "general-disability",
            "--entry",
            "50:20",
            "--entry",
            "40",
        ]);
        assert_eq!(args.committee, CliCommitteeType::GeneralDisability);
        assert_eq!(args.regulation_addition, CliRegulationAddition::None);
        assert_eq!(args.entries.len(), 2);
        assert_eq!(args.entries[0].prior_condition, 20.0);
        assert_eq!(args.entries[1].prior_condition, 0.0);
    }

    #[test]
    fn accepts_fraction_and_word_forms_of_addition() {
        for value in ["1/2", "half"] {
            let args = calculate_args(&[
                "disability-calc",
                "calculate",
                "--committee",
                "work-injury",
                "--regulation-addition",
                value,
                "--entry",
                "60",
            ]);
            assert_eq!(args.regulation_addition, CliRegulationAddition::Half);
        }
    }

    #[test]
    fn rejects_out_of_range_entry() {
        let err = Cli::try_parse_from([
            "disability-calc",
            "calculate",
            "--committee",
            "income-tax",
            "--entry",
            "150",
        ])
        .expect_err("150 is out of range");
        assert!(err.to_string().contains("0-100"));
    }

    #[test]
    fn requires_at_least_one_entry() {
        assert!(
            Cli::try_parse_from(["disability-calc", "calculate", "--committee", "income-tax"])
                .is_err()
        );
    }

    #[test]
    fn text_report_shows_intermediate_and_capped_final() {
        let args = calculate_args(&[
            "disability-calc",
            "calculate",
            "--committee",
            "work-injury",
            "--regulation-addition",
            "1/2",
            "--entry",
            "40",
            "--entry",
            "60",
        ]);
        let output = run_calculate(args).expect("calculation renders");
        assert!(output.contains("Regulation 15 addition: 1/2"));
        assert!(output.contains("Intermediate (arithmetic): 76%"));
        assert!(output.ends_with("Final weighted disability: 100%"));
    }

    #[test]
    fn text_report_hides_ignored_addition_and_lists_steps() {
        let args = calculate_args(&[
            "disability-calc",
            "calculate",
            "--committee",
            "income-tax",
            "--regulation-addition",
            "1/2",
            "--entry",
            "40",
            "--entry",
            "60",
            "--steps",
        ]);
        let output = run_calculate(args).expect("calculation renders");
        assert!(!output.contains("Regulation 15"));
        assert!(output.contains("1. entry 2: net 60% -> +60.00% (remaining capacity 40.00%)"));
        assert!(output.contains("2. entry 1: net 40% -> +16.00% (remaining capacity 24.00%)"));
        assert!(output.ends_with("Final weighted disability: 76%"));
    }

    #[test]
    fn json_output_uses_wire_names() {
        let args = calculate_args(&[
            "disability-calc",
            "calculate",
            "--committee",
            "general-disability",
            "--entry",
            "50:20",
            "--json",
        ]);
        let output = run_calculate(args).expect("calculation renders");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["committeeType"], "general-disability");
        assert_eq!(value["intermediate"], 30.0);
        assert_eq!(value["final"], 30.0);
    }

    #[test]
    fn serve_accepts_host_and_port_overrides() {
        match parse(&["disability-calc", "serve", "--host", "0.0.0.0", "--port", "9001"]).command {
            Command::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(9001));
            }
            Command::Calculate(_) => panic!("expected serve subcommand"),
        }
    }
}
