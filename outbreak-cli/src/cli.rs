//! Command-line interface for the outbreak propagation engine.
//!
//! The CLI is the presentation collaborator: it generates a population from
//! the given constraints, applies exactly one infection request, and renders
//! the resulting node/update stream as text. All algorithmic work lives in
//! `outbreak-core`.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use outbreak_core::{
    GeneratorBuilder, GeneratorError, GraphView, InfectionError, InfectionReport,
    InfectionRequest, UserGenerator, UserId, apply, publish_population, publish_report,
};
use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error;

const DEFAULT_REUSE_PROBABILITY: f64 = outbreak_core::DEFAULT_REUSE_PROBABILITY;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "outbreak", about = "Propagate version changes through a coach/student graph.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a population and run one infection against it.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Minimum number of users to generate (must be at least 1).
    #[arg(long = "min-users", allow_negative_numbers = true)]
    pub min_users: i64,

    /// Maximum number of direct students per user (must not be negative).
    #[arg(long = "max-students", allow_negative_numbers = true)]
    pub max_students: i64,

    /// Number of coach/student levels to generate (must be at least 1).
    #[arg(long, allow_negative_numbers = true)]
    pub levels: i64,

    /// Probability of reusing an existing user as a student.
    #[arg(long = "reuse-probability", default_value_t = DEFAULT_REUSE_PROBABILITY)]
    pub reuse_probability: f64,

    /// Seed for the random generator; omit for a fresh population each run.
    #[arg(long = "rng-seed")]
    pub rng_seed: Option<u64>,

    /// Also print every generated node with its adjacency.
    #[arg(long = "show-graph")]
    pub show_graph: bool,

    /// Infection mode to apply.
    #[command(subcommand)]
    pub mode: Mode,
}

/// Infection modes supported by the `run` command.
#[derive(Debug, Subcommand, Clone)]
pub enum Mode {
    /// Flood the seed's entire connected component.
    Total(TotalArgs),
    /// Flood from the seed under a node-count budget.
    Limited(LimitedArgs),
    /// Infect the first component of exactly the requested size.
    Strict(StrictArgs),
}

/// Arguments for total infection.
#[derive(Debug, Args, Clone)]
pub struct TotalArgs {
    /// Index of the seed user.
    #[arg(long)]
    pub node: usize,
}

/// Arguments for limited infection.
#[derive(Debug, Args, Clone)]
pub struct LimitedArgs {
    /// Index of the seed user.
    #[arg(long)]
    pub node: usize,

    /// Maximum number of users to infect (must not be negative).
    #[arg(long, allow_negative_numbers = true)]
    pub budget: i64,
}

/// Arguments for strict infection.
#[derive(Debug, Args, Clone)]
pub struct StrictArgs {
    /// Required connected-component size.
    #[arg(long)]
    pub exact: usize,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Generator parameters failed validation.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// The infection request failed.
    #[error(transparent)]
    Infection(#[from] InfectionError),
}

impl CliError {
    /// Returns the stable machine-readable code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Generator(err) => err.code().as_str(),
            Self::Infection(err) => err.code().as_str(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Number of users in the generated population.
    pub population_size: usize,
    /// Rendered node lines, present when `--show-graph` was given.
    pub nodes: Vec<String>,
    /// Per-user updates announced after the infection completed.
    pub updates: Vec<(UserId, u32)>,
    /// Report returned by the infection engine.
    pub report: InfectionReport,
}

/// Text renderer for the display contract.
#[derive(Debug, Default)]
struct TextView {
    nodes: Vec<String>,
    updates: Vec<(UserId, u32)>,
}

impl GraphView for TextView {
    fn add_node(&mut self, id: UserId, version: u32, coaches: &[UserId], students: &[UserId]) {
        self.nodes.push(format!(
            "{id} v{version} coaches=[{}] students=[{}]",
            join_ids(coaches),
            join_ids(students)
        ));
    }

    fn update_node(&mut self, id: UserId, version: u32) {
        self.updates.push((id, version));
    }
}

fn join_ids(ids: &[UserId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when parameter validation or the infection request
/// fails.
///
/// # Examples
/// ```
/// use clap::Parser;
/// use outbreak_cli::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from([
///     "outbreak", "run", "--min-users", "3", "--max-students", "2",
///     "--levels", "2", "--rng-seed", "7", "total", "--node", "0",
/// ]);
/// let summary = run_cli(cli)?;
/// assert!(summary.population_size >= 3);
/// assert_eq!(summary.report.version(), 1);
/// # Ok::<(), outbreak_cli::cli::CliError>(())
/// ```
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => run_command(run),
    }
}

fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let generator = build_generator(&command)?;
    let mut rng = command
        .rng_seed
        .map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);
    let mut population = generator.generate(&mut rng);

    let mut view = TextView::default();
    if command.show_graph {
        publish_population(&population, &mut view);
    }

    let request = infection_request(&command.mode);
    let report = apply(&mut population, request)?;
    publish_report(&report, &mut view);

    Ok(ExecutionSummary {
        population_size: population.len(),
        nodes: view.nodes,
        updates: view.updates,
        report,
    })
}

fn build_generator(command: &RunCommand) -> Result<UserGenerator, GeneratorError> {
    let min_users = usize::try_from(command.min_users)
        .map_err(|_| GeneratorError::InvalidMinUsers {
            got: command.min_users,
        })?;
    let max_students =
        usize::try_from(command.max_students).map_err(|_| GeneratorError::InvalidMaxStudents {
            got: command.max_students,
        })?;
    let levels = usize::try_from(command.levels).map_err(|_| GeneratorError::InvalidLevels {
        got: command.levels,
    })?;

    GeneratorBuilder::new()
        .with_min_users(min_users)
        .with_max_students(max_students)
        .with_levels(levels)
        .with_reuse_probability(command.reuse_probability)
        .build()
}

fn infection_request(mode: &Mode) -> InfectionRequest {
    match mode {
        Mode::Total(args) => InfectionRequest::Total {
            seed: UserId::new(args.node),
        },
        Mode::Limited(args) => InfectionRequest::Limited {
            seed: UserId::new(args.node),
            budget: args.budget,
        },
        Mode::Strict(args) => InfectionRequest::Strict { exact: args.exact },
    }
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "population: {} users", summary.population_size)?;
    for node in &summary.nodes {
        writeln!(writer, "{node}")?;
    }
    let outcome = if summary.report.is_complete() {
        "complete"
    } else {
        "budget exhausted"
    };
    writeln!(writer, "infected version: {}", summary.report.version())?;
    writeln!(writer, "outcome: {outcome}")?;
    writeln!(writer, "updated: {} users", summary.updates.len())?;
    for (id, version) in &summary.updates {
        writeln!(writer, "{id}\t{version}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;
    use outbreak_core::InfectionOutcome;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    fn run(args: &[&str]) -> Result<ExecutionSummary, CliError> {
        run_cli(parse(args))
    }

    #[rstest]
    fn total_run_updates_the_seed_component() {
        let summary = run(&[
            "outbreak", "run", "--min-users", "4", "--max-students", "3", "--levels", "2",
            "--rng-seed", "42", "total", "--node", "0",
        ])
        .expect("run must succeed");

        assert!(summary.population_size >= 4);
        assert_eq!(summary.report.version(), 1);
        assert!(summary.report.is_complete());
        assert_eq!(summary.updates.len(), summary.report.changed().len());
        assert_eq!(summary.updates.first(), Some(&(UserId::new(0), 1)));
        assert!(summary.nodes.is_empty());
    }

    #[rstest]
    fn runs_are_reproducible_under_a_fixed_seed() {
        let args = [
            "outbreak", "run", "--min-users", "5", "--max-students", "4", "--levels", "3",
            "--rng-seed", "7", "total", "--node", "0",
        ];
        let first = run(&args).expect("run must succeed");
        let second = run(&args).expect("run must succeed");

        assert_eq!(first.population_size, second.population_size);
        assert_eq!(first.updates, second.updates);
    }

    #[rstest]
    fn show_graph_renders_every_node() {
        let summary = run(&[
            "outbreak", "run", "--min-users", "3", "--max-students", "2", "--levels", "2",
            "--rng-seed", "1", "--show-graph", "total", "--node", "0",
        ])
        .expect("run must succeed");

        assert_eq!(summary.nodes.len(), summary.population_size);
        assert!(summary.nodes[0].starts_with("u0 v0"));
    }

    #[rstest]
    fn limited_run_reports_exhaustion() {
        let summary = run(&[
            "outbreak", "run", "--min-users", "1", "--max-students", "3", "--levels", "3",
            "--rng-seed", "3", "limited", "--node", "0", "--budget", "1",
        ])
        .expect("run must succeed");

        assert_eq!(summary.report.version(), 1);
        if summary.population_size > 1 {
            assert_eq!(summary.report.outcome(), InfectionOutcome::BudgetExhausted);
        }
    }

    #[rstest]
    #[case::min_users(
        &["outbreak", "run", "--min-users", "-1", "--max-students", "2", "--levels", "2", "total", "--node", "0"],
        "GENERATOR_INVALID_MIN_USERS"
    )]
    #[case::max_students(
        &["outbreak", "run", "--min-users", "2", "--max-students", "-3", "--levels", "2", "total", "--node", "0"],
        "GENERATOR_INVALID_MAX_STUDENTS"
    )]
    #[case::levels(
        &["outbreak", "run", "--min-users", "2", "--max-students", "2", "--levels", "0", "total", "--node", "0"],
        "GENERATOR_INVALID_LEVELS"
    )]
    #[case::probability(
        &["outbreak", "run", "--min-users", "2", "--max-students", "2", "--levels", "2", "--reuse-probability", "1.5", "total", "--node", "0"],
        "GENERATOR_INVALID_PROBABILITY"
    )]
    fn invalid_generation_parameters_fail_fast(
        #[case] args: &[&str],
        #[case] expected_code: &str,
    ) {
        let err = run(args).expect_err("invalid parameters must be rejected");
        assert!(matches!(err, CliError::Generator(_)));
        assert_eq!(err.code(), expected_code);
    }

    #[rstest]
    fn negative_budget_is_a_typed_error() {
        let err = run(&[
            "outbreak", "run", "--min-users", "2", "--max-students", "2", "--levels", "2",
            "--rng-seed", "5", "limited", "--node", "0", "--budget", "-2",
        ])
        .expect_err("negative budget must be rejected");

        assert!(matches!(
            err,
            CliError::Infection(InfectionError::InvalidBudget { got: -2 })
        ));
        assert_eq!(err.code(), "INFECTION_INVALID_BUDGET");
    }

    #[rstest]
    fn non_numeric_budget_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "outbreak", "run", "--min-users", "2", "--max-students", "2", "--levels", "2",
            "limited", "--node", "0", "--budget", "lots",
        ]);
        assert!(result.is_err());
    }

    #[rstest]
    fn unknown_seed_node_is_a_typed_error() {
        let err = run(&[
            "outbreak", "run", "--min-users", "1", "--max-students", "0", "--levels", "1",
            "--rng-seed", "0", "total", "--node", "9",
        ])
        .expect_err("out-of-range node must be rejected");

        assert!(matches!(
            err,
            CliError::Infection(InfectionError::UnknownUser { .. })
        ));
    }

    #[rstest]
    fn impossible_exact_size_reports_no_match() {
        let err = run(&[
            "outbreak", "run", "--min-users", "2", "--max-students", "0", "--levels", "1",
            "--rng-seed", "0", "strict", "--exact", "5",
        ])
        .expect_err("no component of size five exists");

        assert!(matches!(
            err,
            CliError::Infection(InfectionError::NoExactMatch { requested: 5 })
        ));
    }

    #[rstest]
    fn render_summary_lists_updates() {
        let summary = run(&[
            "outbreak", "run", "--min-users", "2", "--max-students", "0", "--levels", "1",
            "--rng-seed", "0", "total", "--node", "1",
        ])
        .expect("run must succeed");

        let mut buffer = Vec::new();
        render_summary(&summary, &mut buffer).expect("rendering must succeed");
        let text = String::from_utf8(buffer).expect("output must be UTF-8");

        assert!(text.contains("population: 2 users"));
        assert!(text.contains("infected version: 1"));
        assert!(text.contains("outcome: complete"));
        assert!(text.contains("updated: 1 users"));
        assert!(text.contains("u1\t1"));
    }
}
