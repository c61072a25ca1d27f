use std::fmt::Write as _;

use anyhow::{Result, anyhow};
use clap::Parser;
use similar::TextDiff;

use meshview::{GraphOptions, MeshviewConfig, OutputKind, render_snapshot};
use meshview_core::Snapshot;
use meshview_dot::RenderOptions;

use crate::corpus::{Corpus, CorpusCase, CorpusFile};

/// Expectation kinds a case may declare.
pub const EXPECTATION_KINDS: &[&str] = &["dot", "view", "edges", "error"];

#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub filter: Option<String>,
    pub update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Failed,
    Updated,
    NoExpectations,
}

#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub id: String,
    pub status: CaseStatus,
    pub message: Option<String>,
    /// Expectation kinds whose output did not match, in declaration order.
    pub failed_kinds: Vec<String>,
}

/// Parses a case's `args:` line with the same flags the binary accepts.
#[derive(Parser, Debug)]
#[command(name = "meshview-case", no_binary_name = true)]
struct CaseArgs {
    #[command(flatten)]
    graph: GraphOptions,
}

pub fn run_cases(corpus: &mut Corpus, config: RunnerConfig) -> Result<Vec<CaseOutcome>> {
    let mut outcomes = Vec::new();
    let mut matched = 0usize;

    for file in corpus.files_mut() {
        outcomes.extend(run_cases_in_file(
            file,
            config.update,
            config.filter.as_deref(),
            &mut matched,
        )?);
    }

    if matched == 0 {
        return Err(anyhow!(
            "no meshview-test cases matched filter {:?}",
            config.filter
        ));
    }

    Ok(outcomes)
}

fn run_cases_in_file(
    file: &mut CorpusFile,
    update: bool,
    filter: Option<&str>,
    matched: &mut usize,
) -> Result<Vec<CaseOutcome>> {
    let mut file_outcomes = Vec::new();
    for case in &mut file.cases {
        if filter.is_some_and(|term| !case.id().contains(term)) {
            continue;
        }

        *matched += 1;
        let (outcome, mutated) = evaluate_case(case, update)?;
        if mutated {
            file.dirty = true;
        }
        file_outcomes.push(outcome);
    }
    Ok(file_outcomes)
}

fn evaluate_case(case: &mut CorpusCase, update: bool) -> Result<(CaseOutcome, bool)> {
    let case_id = case.id();

    if case.expectations.is_empty() {
        return Ok((
            CaseOutcome {
                id: case_id,
                status: CaseStatus::NoExpectations,
                message: Some("no expectation blocks declared".to_string()),
                failed_kinds: Vec::new(),
            },
            false,
        ));
    }

    let options = case_options(case)?;
    let mut mutated = false;
    let mut status = CaseStatus::Passed;
    let mut failures = Vec::new();
    let mut failed_kinds = Vec::new();

    for expect in &mut case.expectations {
        let actual = render_expectation(&expect.kind, &case.snapshot, &options, &case_id)?;
        let expected_norm = normalize(&expect.value);
        let actual_norm = normalize(&actual);

        if expected_norm == actual_norm {
            continue;
        }

        if update {
            expect.value = ensure_trailing_newline(actual);
            mutated = true;
            status = CaseStatus::Updated;
        } else {
            status = CaseStatus::Failed;
            failed_kinds.push(expect.kind.clone());
            failures.push(format_expectation_diff(
                &expect.kind,
                &expected_norm,
                &actual_norm,
            ));
        }
    }

    let message = if failures.is_empty() {
        None
    } else {
        Some(failures.join("\n"))
    };

    Ok((
        CaseOutcome {
            id: case_id,
            status,
            message,
            failed_kinds,
        },
        mutated,
    ))
}

fn case_options(case: &CorpusCase) -> Result<RenderOptions> {
    let args = CaseArgs::try_parse_from(&case.args)
        .map_err(|err| anyhow!("invalid args for {}: {}", case.id(), err))?;
    Ok(args.graph.resolve(&MeshviewConfig::default()))
}

/// Render one expectation. Pipeline failures are part of the output, so an
/// `error` block can pin the kind a bad snapshot produces.
fn render_expectation(
    kind: &str,
    snapshot_json: &str,
    options: &RenderOptions,
    case_id: &str,
) -> Result<String> {
    let output = match kind {
        "dot" => OutputKind::Dot,
        "view" => OutputKind::View { pretty: true },
        "edges" => OutputKind::Edges,
        "error" => OutputKind::Dot,
        other => {
            return Err(anyhow!(
                "unknown expectation kind '{other}' in {case_id} (expected one of {})",
                EXPECTATION_KINDS.join(", ")
            ));
        }
    };

    let result = Snapshot::from_json(snapshot_json)
        .and_then(|snapshot| render_snapshot(output, &snapshot, options));

    Ok(match (kind, result) {
        ("error", Ok(_)) => "no error\n".to_string(),
        ("error", Err(err)) => format!("{}\n", err.kind()),
        (_, Ok(text)) => text,
        (_, Err(err)) => format!("error: {}: {}\n", err.kind(), err.message()),
    })
}

fn format_expectation_diff(kind: &str, expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut buf = String::new();
    let _ = writeln!(buf, "Expectation '{kind}' mismatch:");
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-",
            similar::ChangeTag::Insert => "+",
            similar::ChangeTag::Equal => " ",
        };
        let _ = write!(buf, "{sign}{change}");
        if change.missing_newline() {
            buf.push('\n');
        }
    }
    buf
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end_matches('\n').to_string()
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusCaseExpectation;
    use pretty_assertions::assert_eq;

    fn case(args: &[&str], snapshot: &str, kind: &str, value: &str) -> CorpusCase {
        CorpusCase {
            suite: "unit".to_string(),
            name: "case".to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            snapshot: snapshot.to_string(),
            expectations: vec![CorpusCaseExpectation {
                kind: kind.to_string(),
                value: value.to_string(),
            }],
            comments: Vec::new(),
        }
    }

    const PAIR: &str = r#"[
        {"id": "A-node1", "peers": ["B-node2"], "self": true},
        {"id": "B-node2", "peers": ["A-node1"], "self": false}
    ]"#;

    #[test]
    fn test_passing_case() {
        let mut c = case(&[], PAIR, "edges", "A-node1 -- B-node2  (node1 -- node2)\n");
        let (outcome, mutated) = evaluate_case(&mut c, false).unwrap();
        assert_eq!(outcome.status, CaseStatus::Passed);
        assert!(!mutated);
    }

    #[test]
    fn test_failing_case_reports_diff() {
        let mut c = case(&[], PAIR, "edges", "A-node1 -- C-node3  (node1 -- node3)\n");
        let (outcome, _) = evaluate_case(&mut c, false).unwrap();
        assert_eq!(outcome.status, CaseStatus::Failed);
        assert_eq!(outcome.failed_kinds, vec!["edges"]);
        let message = outcome.message.unwrap();
        assert!(message.contains("Expectation 'edges' mismatch:"));
        assert!(message.contains("+A-node1 -- B-node2  (node1 -- node2)"));
    }

    #[test]
    fn test_update_blesses_actual() {
        let mut c = case(&[], PAIR, "edges", "stale\n");
        let (outcome, mutated) = evaluate_case(&mut c, true).unwrap();
        assert_eq!(outcome.status, CaseStatus::Updated);
        assert!(mutated);
        assert_eq!(c.expectations[0].value, "A-node1 -- B-node2  (node1 -- node2)\n");
    }

    #[test]
    fn test_error_expectation() {
        let snapshot = r#"[{"id": "A-1", "peers": ["A-1"], "self": true}]"#;
        let mut c = case(&["--self-loops", "reject"], snapshot, "error", "SelfLoop\n");
        let (outcome, _) = evaluate_case(&mut c, false).unwrap();
        assert_eq!(outcome.status, CaseStatus::Passed);

        let mut ok = case(&[], snapshot, "error", "no error\n");
        let (outcome, _) = evaluate_case(&mut ok, false).unwrap();
        assert_eq!(outcome.status, CaseStatus::Passed);
    }

    #[test]
    fn test_bad_args_and_kind() {
        let mut c = case(&["--self-loops", "sometimes"], PAIR, "edges", "");
        assert!(evaluate_case(&mut c, false).is_err());

        let mut c = case(&[], PAIR, "symbols", "");
        let err = evaluate_case(&mut c, false).unwrap_err();
        assert!(err.to_string().contains("unknown expectation kind 'symbols'"));
    }

    #[test]
    fn test_no_expectations() {
        let mut c = case(&[], PAIR, "edges", "");
        c.expectations.clear();
        let (outcome, _) = evaluate_case(&mut c, false).unwrap();
        assert_eq!(outcome.status, CaseStatus::NoExpectations);
    }
}
