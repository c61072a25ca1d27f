use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use meshview_test::{CaseOutcome, CaseStatus, Corpus, CorpusCase, RunnerConfig, run_cases};

#[derive(Parser, Debug)]
#[command(name = "meshview-test", about = "Snapshot corpus runner for meshview", version)]
struct Cli {
    /// Directory holding `.meshview` corpus files
    #[arg(long, value_name = "DIR", default_value = "tests/corpus")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every case and compare against its expect blocks
    Run {
        /// Only cases whose `suite::name` id contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Overwrite mismatching expect blocks with the current output
        #[arg(long)]
        update: bool,
    },
    /// Show cases grouped by suite with their graph flags and expect kinds
    List {
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { filter, update } => run_command(cli.root, filter, update),
        Command::List { filter } => list_command(cli.root, filter.as_deref()),
    }
}

/// Per-run counters, with failures broken down by expectation kind.
#[derive(Default)]
struct Tally {
    passed: usize,
    updated: usize,
    failed: usize,
    skipped: usize,
    failed_by_kind: BTreeMap<String, usize>,
}

impl Tally {
    fn record(&mut self, outcome: &CaseOutcome) {
        match outcome.status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Updated => self.updated += 1,
            CaseStatus::NoExpectations => self.skipped += 1,
            CaseStatus::Failed => {
                self.failed += 1;
                for kind in &outcome.failed_kinds {
                    *self.failed_by_kind.entry(kind.clone()).or_default() += 1;
                }
            }
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} updated, {} failed",
            self.passed, self.updated, self.failed
        )?;
        if !self.failed_by_kind.is_empty() {
            write!(f, " ({})", join_counts(&self.failed_by_kind))?;
        }
        write!(f, ", {} without expectations", self.skipped)
    }
}

fn join_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(kind, n)| format!("{kind}: {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_command(root: PathBuf, filter: Option<String>, update: bool) -> Result<()> {
    let mut corpus = Corpus::load(&root)?;
    let outcomes = run_cases(&mut corpus, RunnerConfig { filter, update })?;

    let mut tally = Tally::default();
    for outcome in &outcomes {
        tally.record(outcome);
        match outcome.status {
            CaseStatus::Passed => println!("[PASS] {}", outcome.id),
            CaseStatus::Updated => println!("[UPD ] {}", outcome.id),
            CaseStatus::NoExpectations => println!("[SKIP] {}", outcome.id),
            CaseStatus::Failed => {
                println!("[FAIL] {} ({})", outcome.id, outcome.failed_kinds.join(", "));
                for line in outcome.message.iter().flat_map(|m| m.lines()) {
                    println!("        {line}");
                }
            }
        }
    }

    if update {
        corpus.write_updates()?;
    }
    println!("\nSummary: {tally}");

    if tally.failed > 0 {
        bail!("{} snapshot case(s) failed", tally.failed);
    }
    Ok(())
}

fn describe_case(case: &CorpusCase) -> String {
    let mut line = format!("  {} [{}]", case.name, case.expectation_kinds().join(", "));
    if !case.args.is_empty() {
        line.push_str(&format!("  args: {}", shell_words::join(&case.args)));
    }
    line
}

fn list_command(root: PathBuf, filter: Option<&str>) -> Result<()> {
    let corpus = Corpus::load(&root)?;
    let mut count = 0usize;
    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();

    for file in corpus.files() {
        let cases: Vec<&CorpusCase> = file
            .cases
            .iter()
            .filter(|case| filter.is_none_or(|term| case.id().contains(term)))
            .collect();
        if cases.is_empty() {
            continue;
        }

        println!("{}", file.suite);
        for case in cases {
            count += 1;
            for kind in case.expectation_kinds() {
                *by_kind.entry(kind.to_string()).or_default() += 1;
            }
            println!("{}", describe_case(case));
        }
    }

    if count == 0 {
        match filter {
            Some(term) => bail!("no meshview-test cases matching '{term}'"),
            None => bail!("no meshview-test cases under {}", root.display()),
        }
    }
    println!("\n{count} case(s); expectations: {}", join_counts(&by_kind));
    Ok(())
}
