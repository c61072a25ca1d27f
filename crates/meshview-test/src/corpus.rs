use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use shell_words::{join, split};
use walkdir::WalkDir;

const CASE_BANNER: &str =
    "===============================================================================";

/// File extension of corpus files.
pub const CORPUS_EXTENSION: &str = "meshview";

fn slugify_case_name(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if !slug.is_empty() {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "case".to_string()
    } else {
        slug
    }
}

/// Top-level corpus container discovered under a directory (e.g. `tests/corpus`).
pub struct Corpus {
    files: Vec<CorpusFile>,
}

impl Corpus {
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(anyhow!("corpus root {} does not exist", root.display()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .into_iter()
            .filter_map(|res| res.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some(CORPUS_EXTENSION) {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or_else(|_| entry.path());
            let suite = rel.with_extension("").to_string_lossy().replace('\\', "/");
            let path = entry.path().to_path_buf();
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let cases = parse_corpus_file(&suite, &path, &content)?;
            files.push(CorpusFile {
                path,
                suite,
                cases,
                dirty: false,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { files })
    }

    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut [CorpusFile] {
        &mut self.files
    }

    pub fn case_count(&self) -> usize {
        self.files.iter().map(|file| file.cases.len()).sum()
    }

    /// Rewrite every file whose expectations were blessed.
    pub fn write_updates(&mut self) -> Result<()> {
        for file in &mut self.files {
            if file.dirty {
                fs::write(&file.path, file.render())
                    .with_context(|| format!("failed to update {}", file.path.display()))?;
                file.dirty = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub suite: String,
    pub cases: Vec<CorpusCase>,
    pub(crate) dirty: bool,
}

impl CorpusFile {
    fn render(&self) -> String {
        let mut buf = String::new();
        for (idx, case) in self.cases.iter().enumerate() {
            if idx > 0 {
                buf.push_str("\n\n");
            }
            buf.push_str(case.render().trim_end_matches('\n'));
        }
        buf.push('\n');
        buf
    }
}

/// One snapshot plus the outputs expected from it.
#[derive(Debug, Clone)]
pub struct CorpusCase {
    pub suite: String,
    pub name: String,
    /// Extra `meshview` graph flags, e.g. `--self-loops keep`.
    pub args: Vec<String>,
    /// Raw snapshot JSON.
    pub snapshot: String,
    pub expectations: Vec<CorpusCaseExpectation>,
    /// Comment lines (starting with `$//`), kept on rewrite.
    pub comments: Vec<String>,
}

impl CorpusCase {
    pub fn id(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }

    /// Declared expectation kinds, e.g. `["dot", "edges"]`.
    pub fn expectation_kinds(&self) -> Vec<&str> {
        self.expectations
            .iter()
            .map(|entry| entry.kind.as_str())
            .collect()
    }

    pub fn expectation(&self, key: &str) -> Option<&str> {
        self.expectations
            .iter()
            .find(|entry| entry.kind == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn render(&self) -> String {
        let mut buf = String::new();
        for comment in &self.comments {
            buf.push_str(comment);
            buf.push('\n');
        }
        buf.push_str(CASE_BANNER);
        buf.push('\n');
        buf.push_str(&self.name);
        buf.push('\n');
        buf.push_str(CASE_BANNER);
        buf.push_str("\n\n");
        if !self.args.is_empty() {
            buf.push_str(&format!("args: {}\n\n", join(&self.args)));
        }

        buf.push_str("--- snapshot ---\n");
        push_block(&mut buf, &self.snapshot);

        for expect in &self.expectations {
            buf.push_str(&format!("--- expect:{} ---\n", expect.kind));
            push_block(&mut buf, &expect.value);
        }

        buf
    }
}

fn push_block(buf: &mut String, text: &str) {
    buf.push_str(text);
    if !text.ends_with('\n') {
        buf.push('\n');
    }
    buf.push('\n');
}

#[derive(Debug, Clone)]
pub struct CorpusCaseExpectation {
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone)]
enum SectionHeader {
    Snapshot,
    Expect { kind: String },
}

#[derive(Default)]
struct ParseState {
    cases: Vec<CorpusCase>,
    current: Option<CorpusCase>,
    section: Option<SectionHeader>,
    lines: Vec<String>,
}

impl ParseState {
    fn finalize_section(&mut self) -> Result<()> {
        let Some(section) = self.section.take() else {
            self.lines.clear();
            return Ok(());
        };

        let case = self
            .current
            .as_mut()
            .ok_or_else(|| anyhow!("section declared before any case header"))?;

        // blank separator lines before the next header are not content
        while self.lines.last().is_some_and(|line| line.trim().is_empty()) {
            self.lines.pop();
        }
        let mut content = self.lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        match section {
            SectionHeader::Snapshot => case.snapshot = content,
            SectionHeader::Expect { kind } => {
                case.expectations.push(CorpusCaseExpectation {
                    kind,
                    value: content,
                });
            }
        }

        self.lines.clear();
        Ok(())
    }

    fn finish_case(&mut self) -> Result<()> {
        self.finalize_section()?;
        if let Some(case) = self.current.take() {
            self.cases.push(case);
        }
        Ok(())
    }
}

pub(crate) fn parse_corpus_file(suite: &str, path: &Path, content: &str) -> Result<Vec<CorpusCase>> {
    let mut state = ParseState::default();
    let mut awaiting_banner_name = false;
    let mut awaiting_banner_close = false;
    let mut pending_comments: Vec<String> = Vec::new();

    for raw_line in content.lines() {
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.starts_with("$//") {
            pending_comments.push(line.to_string());
            continue;
        }

        if awaiting_banner_close {
            if trimmed.is_empty() {
                continue;
            }
            if is_banner_line(line) {
                awaiting_banner_close = false;
                continue;
            }
            return Err(anyhow!(
                "expected closing banner after case '{}' in {}",
                state
                    .current
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("unknown"),
                path.display()
            ));
        }

        if awaiting_banner_name {
            if trimmed.is_empty() {
                continue;
            }
            state.finish_case()?;
            state.current = Some(CorpusCase {
                suite: suite.to_string(),
                name: slugify_case_name(trimmed),
                args: Vec::new(),
                snapshot: String::new(),
                expectations: Vec::new(),
                comments: std::mem::take(&mut pending_comments),
            });
            awaiting_banner_name = false;
            awaiting_banner_close = true;
            continue;
        }

        if is_banner_line(line) {
            state.finish_case()?;
            awaiting_banner_name = true;
            continue;
        }

        if let Some(section) = parse_section_header(line) {
            state.finalize_section()?;
            state.section = Some(section);
            continue;
        }

        if state.section.is_some() {
            state.lines.push(line.to_string());
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        let case = state.current.as_mut().ok_or_else(|| {
            anyhow!(
                "content encountered before case header in {}",
                path.display()
            )
        })?;

        match trimmed.split_once(':') {
            Some(("args", value)) => {
                case.args = split(value.trim())
                    .map_err(|err| anyhow!("invalid args in {}: {}", path.display(), err))?;
            }
            Some((other, _)) => {
                return Err(anyhow!(
                    "unsupported metadata '{}' in {} case {}",
                    other.trim(),
                    path.display(),
                    case.name
                ));
            }
            None => {
                return Err(anyhow!(
                    "unexpected line '{}' in {} (within case {})",
                    line,
                    path.display(),
                    case.name
                ));
            }
        }
    }

    if awaiting_banner_name || awaiting_banner_close {
        return Err(anyhow!(
            "unterminated banner in {} (missing case name or closing separator)",
            path.display()
        ));
    }
    state.finish_case()?;

    if state.cases.is_empty() {
        return Err(anyhow!(
            "corpus file {} does not contain any cases",
            path.display()
        ));
    }

    for case in &state.cases {
        if case.snapshot.trim().is_empty() {
            return Err(anyhow!(
                "case {} in {} does not declare a snapshot",
                case.id(),
                path.display()
            ));
        }
    }

    Ok(state.cases)
}

fn is_banner_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.len() >= 5 && trimmed.chars().all(|ch| ch == '=')
}

fn parse_section_header(line: &str) -> Option<SectionHeader> {
    if !line.starts_with("---") || !line.ends_with("---") || line.len() < 6 {
        return None;
    }

    let inner = line.trim_start_matches('-').trim_end_matches('-').trim();
    if inner == "snapshot" {
        return Some(SectionHeader::Snapshot);
    }
    inner.strip_prefix("expect:").map(|kind| SectionHeader::Expect {
        kind: kind.trim().to_string(),
    })
}
