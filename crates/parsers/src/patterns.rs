//! Ordered table of message-start recognizers, one per historical transcript
//! convention.
//!
//! Rules are tried in [`LINE_RULES`] order and the first match wins. Lines
//! carrying an absolute timestamp come first, then clock-time lines, then
//! plain label forms, and finally the generic `Word:` heuristic. A rule
//! either claims the whole line or returns `None`; it never half-matches.

use crate::timestamp::{ABSOLUTE_PATTERN, CLOCK_PATTERN};
use regex::Regex;
use std::sync::LazyLock;

/// A line that opens a new message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStart {
    /// Raw speaker label (markup stripped, original case).
    pub label: String,
    /// Text after the label on the same line, if any.
    pub inline: Option<String>,
    /// Raw timestamp cue text, if the line carries one.
    pub cue: Option<String>,
}

pub struct LineRule {
    pub name: &'static str,
    recognize: fn(&str) -> Option<LineStart>,
}

impl LineRule {
    pub fn recognize(&self, line: &str) -> Option<LineStart> {
        (self.recognize)(line)
    }
}

impl std::fmt::Debug for LineRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRule").field("name", &self.name).finish()
    }
}

pub static LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "bracketed_iso",
        recognize: bracketed_iso,
    },
    LineRule {
        name: "heading_iso",
        recognize: heading_iso,
    },
    LineRule {
        name: "bold_clock",
        recognize: bold_clock,
    },
    LineRule {
        name: "bracketed_clock",
        recognize: bracketed_clock,
    },
    LineRule {
        name: "bold_label",
        recognize: bold_label,
    },
    LineRule {
        name: "heading_label",
        recognize: heading_label,
    },
    LineRule {
        name: "said",
        recognize: said,
    },
    LineRule {
        name: "plain_known",
        recognize: plain_known,
    },
    LineRule {
        name: "generic_word",
        recognize: generic_word,
    },
];

/// First rule that claims `line`, with its name.
pub fn match_line(line: &str) -> Option<(&'static str, LineStart)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    LINE_RULES
        .iter()
        .find_map(|rule| rule.recognize(line).map(|start| (rule.name, start)))
}

// ── Rule regexes ────────────────────────────────────────────────────────────

static BRACKETED_ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:\*\*)?\[(?P<ts>{ABSOLUTE_PATTERN})\]\s*(?:\*\*)?(?P<label>[^:*\[\]]+?)\s*(?:\*\*)?:(?:\*\*)?\s*(?P<inline>.*)$"
    ))
    .unwrap()
});

static HEADING_ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^#{{1,6}}\s+(?P<label>[^#].*?)\s+[-–—|]\s+(?P<ts>{ABSOLUTE_PATTERN})\s*$"
    ))
    .unwrap()
});

static BOLD_CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\*\*(?P<ts>{CLOCK_PATTERN})\s*[-–—|]\s*(?P<label>[^*:]+?)\s*(?:\*\*\s*:|:\s*\*\*)\s*(?P<inline>.*)$"
    ))
    .unwrap()
});

static BRACKETED_CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:\*\*)?\[(?P<ts>{CLOCK_PATTERN})\]\s*(?:\*\*)?(?P<label>[^:*\[\]]+?)\s*(?:\*\*)?:(?:\*\*)?\s*(?P<inline>.*)$"
    ))
    .unwrap()
});

static BOLD_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*(?P<label>[^*:\[\]]{1,40}?)\s*(?:\*\*\s*:|:\s*\*\*)\s*(?P<inline>.*)$")
        .unwrap()
});

static HEADING_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(?P<label>[^:#]{1,40}?)\s*:\s*$").unwrap());

static SAID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\*\*)?(?P<label>[A-Za-z][\w .'()-]{0,40}?)\s+(?i:said)(?:\*\*)?\s*:(?:\*\*)?\s*(?P<inline>.*)$",
    )
    .unwrap()
});

static PLAIN_KNOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<label>(?i:you|user|human|me|assistant|ai|bot|chatgpt|gpt|claude|model|system))\s*:\s*(?P<inline>.*)$",
    )
    .unwrap()
});

static GENERIC_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<label>[A-Za-z][\w.-]{0,23}):\s*(?P<inline>.*)$").unwrap());

// ── Recognizers ─────────────────────────────────────────────────────────────

fn capture(re: &Regex, line: &str) -> Option<LineStart> {
    let caps = re.captures(line)?;
    let label = caps.name("label")?.as_str().trim().to_string();
    if label.is_empty() {
        return None;
    }
    let inline = caps
        .name("inline")
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let cue = caps.name("ts").map(|m| m.as_str().trim().to_string());
    Some(LineStart { label, inline, cue })
}

fn bracketed_iso(line: &str) -> Option<LineStart> {
    capture(&BRACKETED_ISO_RE, line)
}

fn heading_iso(line: &str) -> Option<LineStart> {
    capture(&HEADING_ISO_RE, line)
}

fn bold_clock(line: &str) -> Option<LineStart> {
    capture(&BOLD_CLOCK_RE, line)
}

fn bracketed_clock(line: &str) -> Option<LineStart> {
    capture(&BRACKETED_CLOCK_RE, line)
}

/// Markdown callout words that read like labels but open no new turn.
const CALLOUT_LABELS: &[&str] = &[
    "note", "notes", "nb", "n.b", "ps", "p.s", "tip", "tips", "hint", "warning", "caution",
    "important", "example", "examples", "summary", "tl;dr", "tldr", "update", "edit", "reminder",
    "todo", "result", "results", "step", "steps", "context", "source", "sources", "reference",
    "references",
];

fn is_callout(label: &str) -> bool {
    let lower = label.trim_end_matches('.').to_ascii_lowercase();
    let head = lower
        .split(|c: char| c.is_whitespace() || c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    CALLOUT_LABELS.contains(&lower.as_str()) || CALLOUT_LABELS.contains(&head)
}

fn without_callout(start: LineStart) -> Option<LineStart> {
    (!is_callout(&start.label)).then_some(start)
}

fn bold_label(line: &str) -> Option<LineStart> {
    capture(&BOLD_LABEL_RE, line).and_then(without_callout)
}

fn heading_label(line: &str) -> Option<LineStart> {
    capture(&HEADING_LABEL_RE, line).and_then(without_callout)
}

fn said(line: &str) -> Option<LineStart> {
    capture(&SAID_RE, line)
}

fn plain_known(line: &str) -> Option<LineStart> {
    capture(&PLAIN_KNOWN_RE, line)
}

/// `Word: text`, guarded against URLs and scheme-like prefixes.
fn generic_word(line: &str) -> Option<LineStart> {
    let start = capture(&GENERIC_WORD_RE, line).and_then(without_callout)?;
    if start
        .inline
        .as_deref()
        .is_some_and(|inline| inline.starts_with("//"))
    {
        return None;
    }
    let lower = start.label.to_ascii_lowercase();
    if matches!(lower.as_str(), "http" | "https" | "ftp" | "mailto" | "file" | "data") {
        return None;
    }
    Some(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(line: &str) -> Option<&'static str> {
        match_line(line).map(|(name, _)| name)
    }

    fn start(line: &str) -> LineStart {
        match_line(line)
            .unwrap_or_else(|| panic!("no rule matched {line:?}"))
            .1
    }

    #[test]
    fn test_bracketed_iso() {
        let s = start("**[2026-01-20T10:26:07-05:00] User**: Hello there");
        assert_eq!(s.label, "User");
        assert_eq!(s.inline.as_deref(), Some("Hello there"));
        assert_eq!(s.cue.as_deref(), Some("2026-01-20T10:26:07-05:00"));

        let s = start("[2025-12-19 14:03:22 UTC] Zen-001: Morning");
        assert_eq!(s.label, "Zen-001");
        assert_eq!(s.cue.as_deref(), Some("2025-12-19 14:03:22 UTC"));
        assert_eq!(rule_for("[2025-12-19T14:03:22Z] You:"), Some("bracketed_iso"));
    }

    #[test]
    fn test_heading_iso() {
        let s = start("## Zen-001 — 2025-12-19T14:03:22Z");
        assert_eq!(s.label, "Zen-001");
        assert_eq!(s.inline, None);
        assert_eq!(s.cue.as_deref(), Some("2025-12-19T14:03:22Z"));
        assert_eq!(rule_for("### You - 2025-12-19 09:00"), Some("heading_iso"));
    }

    #[test]
    fn test_bold_clock() {
        let s = start("**10:26:07 AM EST - Devon**: Hello");
        assert_eq!(s.label, "Devon");
        assert_eq!(s.inline.as_deref(), Some("Hello"));
        assert_eq!(s.cue.as_deref(), Some("10:26:07 AM EST"));

        let s = start("**3:04 PM - Zen:** Sure.");
        assert_eq!(s.label, "Zen");
        assert_eq!(s.cue.as_deref(), Some("3:04 PM"));
    }

    #[test]
    fn test_bracketed_clock() {
        let s = start("[10:26 AM] Zen: On it");
        assert_eq!(s.label, "Zen");
        assert_eq!(s.cue.as_deref(), Some("10:26 AM"));
        assert_eq!(rule_for("[10:26 AM] Zen: On it"), Some("bracketed_clock"));
    }

    #[test]
    fn test_bold_label_forms() {
        for line in ["**User**: Hello", "**User:** Hello", "**User** : Hello"] {
            let (rule, s) = match_line(line).unwrap();
            assert_eq!(rule, "bold_label", "{line}");
            assert_eq!(s.label, "User");
            assert_eq!(s.inline.as_deref(), Some("Hello"));
            assert_eq!(s.cue, None);
        }
        let s = start("**Assistant**:");
        assert_eq!(s.inline, None);
    }

    #[test]
    fn test_callout_labels_are_not_speakers() {
        for line in [
            "**Note:** the API changed",
            "**Note**: the API changed",
            "**Important:** back up first",
            "**Step 2:** run the migration",
            "**P.S.** : one more thing",
            "### Summary:",
            "Note: the API changed",
            "TODO: follow up",
        ] {
            assert_eq!(match_line(line), None, "{line}");
        }
        assert_eq!(rule_for("**Notary**: signed"), Some("bold_label"));
        assert_eq!(rule_for("Nora: hi"), Some("generic_word"));
    }

    #[test]
    fn test_heading_label_and_said() {
        let s = start("### Zen:");
        assert_eq!(s.label, "Zen");
        assert_eq!(rule_for("### Zen:"), Some("heading_label"));

        let s = start("You said:");
        assert_eq!(s.label, "You");
        assert_eq!(s.inline, None);
        let s = start("ChatGPT said: Sure thing");
        assert_eq!(s.label, "ChatGPT");
        assert_eq!(s.inline.as_deref(), Some("Sure thing"));
    }

    #[test]
    fn test_plain_known_before_generic() {
        assert_eq!(rule_for("You: hi"), Some("plain_known"));
        assert_eq!(rule_for("assistant: hi"), Some("plain_known"));
        assert_eq!(rule_for("Sera: hi"), Some("generic_word"));
    }

    #[test]
    fn test_generic_word_guards() {
        assert_eq!(match_line("https://example.com/page"), None);
        assert_eq!(match_line("http: //example.com"), None);
        assert_eq!(match_line("10:30 is when we meet"), None);
        assert_eq!(match_line("2nd: item"), None);
        assert_eq!(match_line("This is a sentence: with a colon"), None);
        assert_eq!(match_line("Averyveryverylonglabelthatexceedslimit: x"), None);
    }

    #[test]
    fn test_non_message_lines() {
        for line in ["", "Just a plain sentence.", "- bullet point", "> quoted text"] {
            assert_eq!(match_line(line), None, "{line}");
        }
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = LINE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "bracketed_iso",
                "heading_iso",
                "bold_clock",
                "bracketed_clock",
                "bold_label",
                "heading_label",
                "said",
                "plain_known",
                "generic_word",
            ]
        );
    }
}
