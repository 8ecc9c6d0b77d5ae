use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Markdown inline link: [text](target)
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").unwrap());

// *.md-shaped tokens in body text, used for the cross-document graph
static MD_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_\-./]+\.md\b").unwrap());

/// A relative markdown link with the body line it appears on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeLink {
    pub target: String,
    pub line: usize,
}

/// One parsed template document. Parsed once, immutable thereafter.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    pub path: PathBuf,
    /// Flat scalar key/value map from the frontmatter block (no nesting)
    pub frontmatter: BTreeMap<String, String>,
    /// 1-based line numbers of frontmatter lines that were not `key: value`
    pub malformed_frontmatter_lines: Vec<usize>,
    pub body: String,
    /// 1-based line number in the file where the body starts
    pub body_start_line: usize,
    pub links: Vec<RelativeLink>,
    pub usage_line: Option<String>,
    pub md_refs: Vec<String>,
}

impl TemplateDocument {
    /// Read and parse a template file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TemplateError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &contents))
    }

    /// Parse a template from in-memory content.
    ///
    /// Frontmatter is the block between a leading `---` line and the next
    /// `---` line. Documents without frontmatter get an empty map; the
    /// validator reports the missing required keys.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        let lines: Vec<&str> = content.lines().collect();

        let mut frontmatter = BTreeMap::new();
        let mut malformed_frontmatter_lines = Vec::new();
        let mut body_start = 0;

        if lines.first().map(|l| l.trim()) == Some("---") {
            let mut closed = false;
            for (idx, line) in lines.iter().enumerate().skip(1) {
                if line.trim() == "---" {
                    body_start = idx + 1;
                    closed = true;
                    break;
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed.split_once(':') {
                    Some((key, value)) => {
                        frontmatter.insert(key.trim().to_string(), value.trim().to_string());
                    }
                    None => malformed_frontmatter_lines.push(idx + 1),
                }
            }
            if !closed {
                // Unterminated frontmatter swallows the whole file; treat the
                // collected pairs as frontmatter and leave the body empty.
                body_start = lines.len();
            }
        }

        let body = lines[body_start..].join("\n");
        let body_start_line = body_start + 1;

        let mut links = Vec::new();
        for (offset, line) in body.lines().enumerate() {
            for capture in LINK_RE.captures_iter(line) {
                let target = capture[1].to_string();
                if is_relative_target(&target) {
                    links.push(RelativeLink {
                        target,
                        line: body_start_line + offset,
                    });
                }
            }
        }

        let usage_line = body
            .lines()
            .map(str::trim)
            .find(|l| l.starts_with("Usage:"))
            .map(str::to_string);

        let mut md_refs = Vec::new();
        for m in MD_REF_RE.find_iter(&body) {
            let reference = m.as_str().to_string();
            if !md_refs.contains(&reference) {
                md_refs.push(reference);
            }
        }

        Self {
            path,
            frontmatter,
            malformed_frontmatter_lines,
            body,
            body_start_line,
            links,
            usage_line,
            md_refs,
        }
    }

    /// File stem, e.g. `commit-helper` for `commands/commit-helper.md`
    pub fn base_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// File name including extension
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Directory the document lives in; relative links resolve against it
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

fn is_relative_target(target: &str) -> bool {
    !(target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("mailto:")
        || target.starts_with('#')
        || target.starts_with('/'))
}
