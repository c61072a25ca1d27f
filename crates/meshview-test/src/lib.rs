//! Corpus runner for meshview.
//!
//! A corpus file holds snapshot cases and the DOT, view model, edge list or
//! error each case must produce. `meshview-test run --update` rewrites the
//! expectation blocks with current output.
pub mod corpus;
pub mod runner;

pub use corpus::{CORPUS_EXTENSION, Corpus, CorpusCase, CorpusCaseExpectation, CorpusFile};
pub use runner::{CaseOutcome, CaseStatus, EXPECTATION_KINDS, RunnerConfig, run_cases};
