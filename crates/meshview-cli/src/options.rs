//! Shared CLI options for meshview tools.
//!
//! Used by both the `meshview` binary and the `meshview-test` corpus runner
//! so a corpus case's `args:` line means exactly what it means on the
//! command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use meshview_collect::{CollectOptions, SelfLoopPolicy};
use meshview_core::{Error, LocalNodePolicy, Result};
use meshview_dot::RenderOptions;

use crate::config::MeshviewConfig;

/// Environment variable naming the explorer backend when no flag or config does.
pub const ENV_URL: &str = "MESHVIEW_URL";

/// Request timeout used when neither flag nor config sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Options controlling how a snapshot becomes a graph.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphOptions {
    /// Self-loop handling: drop, keep or reject
    #[arg(long = "self-loops", value_name = "POLICY", global = true)]
    pub self_loops: Option<SelfLoopPolicy>,

    /// Local node handling when not exactly one node is marked self: strict or first-match
    #[arg(long = "local", value_name = "POLICY", global = true)]
    pub local_node: Option<LocalNodePolicy>,

    /// Separator between peer id segments used for short labels
    #[arg(long, value_name = "CHAR", global = true)]
    pub delimiter: Option<char>,
}

/// Where the snapshot comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceOptions {
    /// Read the snapshot (or DAG text) from a file, `-` for stdin
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        conflicts_with = "url",
        global = true
    )]
    pub file: Option<PathBuf>,

    /// Base URL of the explorer backend
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout-secs", value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

/// Resolved snapshot location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Stdin,
    File(PathBuf),
    Http { url: String, timeout: Duration },
}

impl GraphOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.self_loops = Some(policy);
        self
    }

    pub fn with_local_node(mut self, policy: LocalNodePolicy) -> Self {
        self.local_node = Some(policy);
        self
    }

    /// Merge flags over the `[render]` config section, then defaults.
    pub fn resolve(&self, config: &MeshviewConfig) -> RenderOptions {
        let render = &config.render;
        let mut collect = CollectOptions::default();
        if let Some(policy) = self.self_loops.or(render.self_loops) {
            collect = collect.with_self_loops(policy);
        }
        if let Some(delimiter) = self.delimiter.or(render.delimiter) {
            collect = collect.with_delimiter(delimiter);
        }

        RenderOptions::new()
            .with_collect(collect)
            .with_local_node(self.local_node.or(render.local_node).unwrap_or_default())
    }
}

impl SourceOptions {
    /// Merge flags over the `[source]` config section and `env_url`.
    ///
    /// A file flag wins outright. Otherwise the first URL found among flag,
    /// config and environment is used. With no URL at all the snapshot is
    /// read from stdin.
    pub fn resolve(&self, config: &MeshviewConfig, env_url: Option<String>) -> Result<SourceSpec> {
        if let Some(file) = &self.file {
            if file.as_os_str() == "-" {
                return Ok(SourceSpec::Stdin);
            }
            return Ok(SourceSpec::File(file.clone()));
        }

        let url = self
            .url
            .clone()
            .or_else(|| config.source.url.clone())
            .or(env_url.filter(|url| !url.trim().is_empty()));

        let Some(url) = url else {
            return Ok(SourceSpec::Stdin);
        };

        let timeout_secs = self
            .timeout_secs
            .or(config.source.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::invalid_argument("timeout must be at least one second")
                .with_operation("cli::options"));
        }

        Ok(SourceSpec::Http {
            url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::ErrorKind;

    fn config(text: &str) -> MeshviewConfig {
        MeshviewConfig::from_toml(text).unwrap()
    }

    #[test]
    fn test_graph_defaults() {
        let render = GraphOptions::new().resolve(&MeshviewConfig::default());
        assert_eq!(render.local_node, LocalNodePolicy::Strict);
        assert_eq!(render.collect.self_loops, SelfLoopPolicy::Drop);
        assert_eq!(render.collect.delimiter, '-');
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = config(
            r#"
            [render]
            self_loops = "keep"
            local_node = "first-match"
            delimiter = "."
            "#,
        );
        let render = GraphOptions::new()
            .with_self_loops(SelfLoopPolicy::Reject)
            .resolve(&cfg);
        assert_eq!(render.collect.self_loops, SelfLoopPolicy::Reject);
        assert_eq!(render.local_node, LocalNodePolicy::FirstMatch);
        assert_eq!(render.collect.delimiter, '.');
    }

    #[test]
    fn test_source_precedence() {
        let cfg = config(
            r#"
            [source]
            url = "http://config:8080"
            timeout_secs = 9
            "#,
        );

        let flags = SourceOptions {
            url: Some("http://flag:8080".to_string()),
            ..Default::default()
        };
        assert_eq!(
            flags.resolve(&cfg, Some("http://env".to_string())).unwrap(),
            SourceSpec::Http {
                url: "http://flag:8080".to_string(),
                timeout: Duration::from_secs(9),
            }
        );

        let none = SourceOptions::default();
        assert_eq!(
            none.resolve(&MeshviewConfig::default(), Some("http://env".to_string()))
                .unwrap(),
            SourceSpec::Http {
                url: "http://env".to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            }
        );
        assert_eq!(
            none.resolve(&MeshviewConfig::default(), Some("  ".to_string()))
                .unwrap(),
            SourceSpec::Stdin
        );
    }

    #[test]
    fn test_file_wins_and_dash_is_stdin() {
        let file = SourceOptions {
            file: Some(PathBuf::from("graph.json")),
            ..Default::default()
        };
        assert_eq!(
            file.resolve(&MeshviewConfig::default(), Some("http://env".to_string()))
                .unwrap(),
            SourceSpec::File(PathBuf::from("graph.json"))
        );

        let dash = SourceOptions {
            file: Some(PathBuf::from("-")),
            ..Default::default()
        };
        assert_eq!(
            dash.resolve(&MeshviewConfig::default(), None).unwrap(),
            SourceSpec::Stdin
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let flags = SourceOptions {
            url: Some("http://x".to_string()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        let err = flags.resolve(&MeshviewConfig::default(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
