use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File-name patterns treated as transcripts when none are configured.
pub const DEFAULT_TRANSCRIPT_GLOBS: &[&str] = &["*.md", "*.txt"];

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Recursively find transcript files under `root` whose file name matches
/// any of `globs`. Results are sorted and deduplicated.
///
/// A `root` that is itself a file is returned as-is.
pub fn find_transcripts(root: &Path, globs: &[String]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        anyhow::bail!("Transcript root {} does not exist", root.display());
    }

    let patterns = if globs.is_empty() {
        DEFAULT_TRANSCRIPT_GLOBS.iter().map(|g| g.to_string()).collect()
    } else {
        globs.to_vec()
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for pattern in patterns {
        let full = format!("{}/**/{}", glob::Pattern::escape(&root.display().to_string()), pattern);
        let paths = glob::glob(&full).with_context(|| format!("Invalid transcript glob {pattern:?}"))?;
        for path in paths.filter_map(Result::ok) {
            if path.is_file() && !is_hidden(root, &path) && seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }
    out.sort();
    tracing::debug!("Found {} transcript file(s) under {}", out.len(), root.display());
    Ok(out)
}

/// True when any component below `root` starts with a dot.
fn is_hidden(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}
