use anyhow::{Context, Result};
use chatty_parsers::discover::{expand_path, DEFAULT_TRANSCRIPT_GLOBS};
use clap::Args;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Phrase to look for (matched literally unless `--regex`).
    pub needle: String,
    /// Directories (or files) to search.
    #[arg(default_value = ".")]
    pub roots: Vec<String>,
    /// File-name glob to include (repeatable; default `*.md` and `*.txt`).
    #[arg(long = "glob")]
    pub globs: Vec<String>,
    /// Search every file regardless of extension.
    #[arg(long, conflicts_with = "globs")]
    pub all_files: bool,
    /// Treat the needle as a regular expression.
    #[arg(long)]
    pub regex: bool,
    /// Match case exactly.
    #[arg(long)]
    pub case_sensitive: bool,
    /// Stop after this many hits (0 for unlimited).
    #[arg(long, default_value_t = 200)]
    pub max: usize,
    /// Lines of context to show around each hit.
    #[arg(long, default_value_t = 0)]
    pub around: usize,
    /// Emit the hits as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextLine {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub line: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ContextLine>,
}

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    needle: &'a str,
    paths: &'a [String],
    globs: &'a [String],
    case_sensitive: bool,
    regex: bool,
    count: usize,
    elapsed_ms: u128,
    matches: &'a [SearchHit],
}

/// Build the line matcher: the needle is escaped unless `regex` is set.
pub fn build_matcher(needle: &str, regex: bool, case_sensitive: bool) -> Result<Regex> {
    let pattern = if regex {
        needle.to_string()
    } else {
        regex::escape(needle)
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .with_context(|| format!("Invalid search pattern {needle:?}"))
}

/// Scan `paths` in order, collecting at most `limit` hits.
///
/// Files that cannot be read are skipped; invalid UTF-8 is replaced.
pub fn search_files(
    paths: &[PathBuf],
    matcher: &Regex,
    around: usize,
    limit: Option<usize>,
) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for path in paths {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            if !matcher.is_match(line) {
                continue;
            }
            hits.push(SearchHit {
                path: path.display().to_string(),
                line: index + 1,
                text: line.to_string(),
                context: context_window(&lines, index, around),
            });
            if limit.is_some_and(|limit| hits.len() >= limit) {
                return hits;
            }
        }
    }
    hits
}

fn context_window(lines: &[&str], index: usize, around: usize) -> Vec<ContextLine> {
    if around == 0 {
        return Vec::new();
    }
    let start = index.saturating_sub(around);
    let end = index.saturating_add(around).saturating_add(1).min(lines.len());
    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, text)| ContextLine {
            line: start + offset + 1,
            text: text.to_string(),
        })
        .collect()
}

fn print_hits(needle: &str, hits: &[SearchHit], elapsed_ms: u128) {
    if hits.is_empty() {
        println!("No matches for {needle:?} (elapsed {elapsed_ms}ms)");
        return;
    }
    println!(
        "{} match(es) for {:?} (elapsed {}ms):",
        hits.len(),
        needle,
        elapsed_ms
    );
    for (idx, hit) in hits.iter().enumerate() {
        println!("{:>3}. {}:{}: {}", idx + 1, hit.path, hit.line, hit.text);
        for ctx in &hit.context {
            let marker = if ctx.line == hit.line { ">>" } else { "  " };
            println!("     {} {:>6} | {}", marker, ctx.line, ctx.text);
        }
    }
}

pub fn run(args: SearchArgs) -> Result<()> {
    let globs = if args.all_files {
        vec!["*".to_string()]
    } else {
        args.globs.clone()
    };
    let matcher = build_matcher(&args.needle, args.regex, args.case_sensitive)?;
    let limit = (args.max > 0).then_some(args.max);

    let started = Instant::now();
    let paths = crate::reconcile_cmd::discover_paths(&args.roots, &globs)?;
    tracing::debug!("Searching {} file(s) for {:?}", paths.len(), args.needle);
    let hits = search_files(&paths, &matcher, args.around, limit);
    let elapsed_ms = started.elapsed().as_millis();

    if args.json {
        let roots: Vec<String> = args
            .roots
            .iter()
            .map(|root| expand_path(root).display().to_string())
            .collect();
        let globs = if globs.is_empty() {
            DEFAULT_TRANSCRIPT_GLOBS
                .iter()
                .map(|g| g.to_string())
                .collect()
        } else {
            globs
        };
        crate::output::print_json(&SearchReport {
            needle: &args.needle,
            paths: &roots,
            globs: &globs,
            case_sensitive: args.case_sensitive,
            regex: args.regex,
            count: hits.len(),
            elapsed_ms,
            matches: &hits,
        })
    } else {
        print_hits(&args.needle, &hits, elapsed_ms);
        Ok(())
    }
}
