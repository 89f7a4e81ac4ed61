//! Compiled preserve and autolock patterns
//!
//! Preserve patterns use gitignore syntax, so `.env*` matches at any depth,
//! `config/*.local` is anchored, and a trailing `/` matches directories only.
//!
//! Autolock patterns are globs over whole branch names instead: `main` matches
//! only `main`, and `*` never crosses a `/`.

use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::Violation;

/// Build one glob the way gitignore matching does: `*` stops at `/` and `\`
/// escapes the next character.
fn build_glob(glob: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
}

/// Check the glob inside a gitignore line.
///
/// `ignore` reads some malformed globs literally (an unclosed `[` for instance),
/// so the glob is checked on its own before the line is added.
fn check_gitignore_line(line: &str) -> Result<(), String> {
    let glob = line.strip_prefix('!').unwrap_or(line);
    let glob = glob.trim_start_matches('/').trim_end_matches('/');
    build_glob(glob).map(drop).map_err(|e| e.kind().to_string())
}

fn invalid(field: &str, i: usize, pattern: &str, reason: impl std::fmt::Display) -> Violation {
    Violation::new(
        format!("{field}[{i}]"),
        format!("invalid pattern {pattern:?}: {reason}"),
    )
}

fn empty(field: &str, i: usize) -> Violation {
    Violation::new(format!("{field}[{i}]"), "pattern is empty")
}

/// A compiled list of gitignore-style patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    matcher: Gitignore,
    len: usize,
}

impl PatternSet {
    /// Compile `patterns`, reporting every invalid one against `field`.
    ///
    /// Violations name the offending element, e.g. `preserve.patterns[2]`.
    pub fn compile(field: &str, patterns: &[String]) -> Result<Self, Vec<Violation>> {
        let mut builder = GitignoreBuilder::new("");
        let mut violations = Vec::new();

        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                violations.push(empty(field, i));
                continue;
            }
            if let Err(reason) = check_gitignore_line(pattern) {
                violations.push(invalid(field, i, pattern, reason));
                continue;
            }
            if let Err(e) = builder.add_line(None, pattern) {
                violations.push(invalid(field, i, pattern, e));
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let matcher = builder
            .build()
            .map_err(|e| vec![Violation::new(field, e.to_string())])?;
        Ok(Self {
            matcher,
            len: patterns.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a project-relative path, or any of its parents, matches.
    ///
    /// Absolute paths never match; callers strip the project root first.
    pub fn is_match(&self, path: &Path, is_dir: bool) -> bool {
        if self.is_empty() || path.has_root() || path.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}

/// Autolock patterns, matched against the full branch name.
#[derive(Debug, Clone)]
pub struct BranchPatterns {
    set: GlobSet,
}

impl BranchPatterns {
    /// Compile `patterns`, reporting every invalid one against `field`.
    pub fn compile(field: &str, patterns: &[String]) -> Result<Self, Vec<Violation>> {
        let mut builder = GlobSetBuilder::new();
        let mut violations = Vec::new();

        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                violations.push(empty(field, i));
                continue;
            }
            match build_glob(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => violations.push(invalid(field, i, pattern, e.kind())),
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let set = builder
            .build()
            .map_err(|e| vec![Violation::new(field, e.to_string())])?;
        Ok(Self { set })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn is_match(&self, branch: &str) -> bool {
        !branch.is_empty() && self.set.is_match(branch)
    }
}

/// Decides which untracked files get copied into a new worktree.
#[derive(Debug, Clone)]
pub struct PreserveMatcher {
    include: PatternSet,
    exclude: PatternSet,
}

impl PreserveMatcher {
    pub fn new(include: PatternSet, exclude: PatternSet) -> Self {
        Self { include, exclude }
    }

    /// A project-relative file is preserved when it matches a preserve pattern and
    /// neither it nor any parent directory matches an exclude pattern.
    pub fn should_preserve(&self, path: &Path) -> bool {
        self.include.is_match(path, false) && !self.exclude.is_match(path, false)
    }
}
