//! Path eligibility for indexing
//!
//! A path is eligible when its extension (or exact basename, for files
//! without one) is allowlisted and it matches no default ignore glob. The
//! project override file can flip either outcome: its lines are checked in
//! order and the first matching line decides, `!pattern` to force-include
//! and `pattern` to exclude.

use crate::config::Config;
use crate::error::Result;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One line of the override file
#[derive(Debug, Clone)]
struct OverrideRule {
    include: bool,
    patterns: Vec<Pattern>,
}

impl OverrideRule {
    fn matches(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }
}

/// Decides which tracked paths get indexed
#[derive(Debug, Clone)]
pub struct PathFilter {
    extensions: HashSet<String>,
    file_names: HashSet<String>,
    ignore: Vec<Pattern>,
    overrides: Vec<OverrideRule>,
}

impl PathFilter {
    /// Build from configuration, without an override file
    pub fn new(config: &Config) -> Result<Self> {
        let ignore = config
            .ignore_globs
            .iter()
            .map(|g| Pattern::new(g))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            file_names: config.file_names.iter().cloned().collect(),
            ignore,
            overrides: Vec::new(),
        })
    }

    /// Build from configuration and the project's override file, if present
    pub fn load(root: &Path, config: &Config) -> Result<Self> {
        let filter = Self::new(config)?;
        let override_path = root.join(&config.ignore_file);
        if !override_path.is_file() {
            return Ok(filter);
        }

        let bytes = match std::fs::read(&override_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable override file {}: {}",
                    override_path.display(),
                    e
                );
                return Ok(filter);
            }
        };
        let filter = filter.with_overrides(&String::from_utf8_lossy(&bytes));
        tracing::debug!(
            "Loaded {} override rules from {}",
            filter.overrides.len(),
            override_path.display()
        );
        Ok(filter)
    }

    /// Replace override rules with those parsed from `content`
    pub fn with_overrides(mut self, content: &str) -> Self {
        self.overrides = content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| parse_override_line(idx + 1, line))
            .collect();
        self
    }

    /// Number of usable override lines
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Whether `path` (project-relative) should be indexed
    pub fn is_eligible(&self, path: &str) -> bool {
        let path = normalize_path(path);

        for rule in &self.overrides {
            if rule.matches(&path) {
                return rule.include;
            }
        }

        self.is_allowed_type(&path) && !self.is_ignored(&path)
    }

    fn is_allowed_type(&self, path: &str) -> bool {
        let p = Path::new(path);
        match p.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.file_names.contains(name)),
        }
    }

    fn is_ignored(&self, path: &str) -> bool {
        self.ignore
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }
}

pub(crate) fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

fn parse_override_line(line_no: usize, line: &str) -> Option<OverrideRule> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (include, raw) = match line.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, line),
    };

    let globs = override_globs(raw)?;
    let patterns = globs
        .iter()
        .map(|g| Pattern::new(g))
        .collect::<std::result::Result<Vec<_>, _>>();

    match patterns {
        Ok(patterns) => Some(OverrideRule { include, patterns }),
        Err(e) => {
            tracing::warn!("Skipping override line {} ({:?}): {}", line_no, line, e);
            None
        }
    }
}

/// Translate an override pattern into equivalent project-relative globs.
///
/// `/x` is anchored at the root, `x/` matches only below a directory, and a
/// pattern without `/` matches the basename at any depth. Non-directory
/// patterns also match everything under a directory of that name.
fn override_globs(raw: &str) -> Option<Vec<String>> {
    let anchored = raw.starts_with('/');
    let body = raw.trim_start_matches('/');
    let dir_only = body.ends_with('/');
    let body = body.trim_end_matches('/');
    if body.is_empty() {
        return None;
    }

    let base = if anchored || body.contains('/') {
        body.to_string()
    } else {
        format!("**/{}", body)
    };

    if dir_only {
        Some(vec![format!("{}/**", base)])
    } else {
        Some(vec![base.clone(), format!("{}/**", base)])
    }
}
