//! Recognizes transcript artifacts that superficially look like messages:
//! separators, bare headings, creation markers, template placeholders,
//! echoed session identifiers and short test strings.
//!
//! The rule table is versioned. New artifact shapes are added to
//! [`GARBAGE_RULES`] (bumping [`GARBAGE_RULESET_VERSION`]) without touching
//! the assembler's control flow.

use chatty_core::Message;
use chatty_runtime_config::GarbageSettings;
use regex::Regex;
use std::sync::LazyLock;

/// Bumped whenever a rule is added, removed, or its pattern changes.
pub const GARBAGE_RULESET_VERSION: u32 = 4;

/// Whether a rule applies to any text or only to short text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Always,
    /// Only checked when the trimmed text is within the short-content ceiling,
    /// so legitimately short real messages elsewhere are not swallowed.
    ShortOnly,
}

#[derive(Debug)]
pub struct GarbageRule {
    pub name: &'static str,
    pub scope: RuleScope,
    regex: Regex,
}

impl GarbageRule {
    fn new(name: &'static str, scope: RuleScope, pattern: &str) -> Self {
        Self {
            name,
            scope,
            regex: Regex::new(pattern).unwrap(),
        }
    }

    pub fn matches(&self, trimmed: &str) -> bool {
        self.regex.is_match(trimmed)
    }
}

/// Built-in rules, checked in order against trimmed text.
pub static GARBAGE_RULES: LazyLock<Vec<GarbageRule>> = LazyLock::new(|| {
    vec![
        GarbageRule::new(
            "horizontal_rule",
            RuleScope::Always,
            r"^(?:\s*(?:-{3,}|\*{3,}|_{3,}|={3,})\s*)+$",
        ),
        GarbageRule::new("bare_header", RuleScope::Always, r"^#{1,6}(?:[ \t][^\n]*)?$"),
        GarbageRule::new("html_comment", RuleScope::Always, r"(?s)^<!--.*-->$"),
        GarbageRule::new(
            "template_placeholder",
            RuleScope::Always,
            r"(?i)^(?:\{\{[^{}]*\}\}|\[(?:insert|your|placeholder|todo)\b[^\]]*\]|<(?:placeholder|message|insert)[^>]*>|(?:your\s+)?(?:message|text|content|response)\s+(?:goes\s+)?here\.?)$",
        ),
        GarbageRule::new(
            "creation_marker",
            RuleScope::ShortOnly,
            r"(?i)^\**(?:created|generated|imported|exported|migrated)(?:\s+(?:by|on|at|from|with|via)\b|:)[^\n]*$",
        ),
        GarbageRule::new(
            "session_id_echo",
            RuleScope::ShortOnly,
            r"(?i)^(?:session(?:[ _-]?id)?\s*[:=#]?\s*)?(?:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|session[_-][\w-]+|(?:[\w-]+_)?chat_with_[\w.-]+)$",
        ),
        GarbageRule::new(
            "test_artifact",
            RuleScope::ShortOnly,
            r"(?i)^(?:test(?:ing)?(?:\s+(?:message|\d+))*|asdf+|qwerty|foo(?:bar)?|lorem ipsum(?:\s+dolor)?)[.!?]*$",
        ),
    ]
});

/// Garbage classifier with deployment-specific additions.
#[derive(Debug)]
pub struct GarbageClassifier {
    short_content_ceiling: usize,
    extra: Vec<Regex>,
}

impl Default for GarbageClassifier {
    fn default() -> Self {
        Self::new(&GarbageSettings::default())
    }
}

impl GarbageClassifier {
    pub fn new(settings: &GarbageSettings) -> Self {
        let extra = settings
            .extra_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Ignoring invalid garbage pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();
        Self {
            short_content_ceiling: settings.short_content_ceiling,
            extra,
        }
    }

    /// Name of the first rule the text matches, if any.
    pub fn classify(&self, text: &str) -> Option<&'static str> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some("empty");
        }
        let is_short = trimmed.chars().count() <= self.short_content_ceiling;

        let builtin = GARBAGE_RULES
            .iter()
            .filter(|rule| rule.scope == RuleScope::Always || is_short)
            .find(|rule| rule.matches(trimmed))
            .map(|rule| rule.name);
        if builtin.is_some() {
            return builtin;
        }
        if is_short && self.extra.iter().any(|re| re.is_match(trimmed)) {
            return Some("configured");
        }
        None
    }

    pub fn is_garbage(&self, text: &str) -> bool {
        self.classify(text).is_some()
    }

    /// Drop garbage dialogue and empty entries. Date headers with content are
    /// structural and always survive. Idempotent.
    pub fn filter(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
            .into_iter()
            .filter(|message| {
                if message.is_date_header {
                    return !message.content.trim().is_empty();
                }
                match self.classify(&message.content) {
                    Some(rule) => {
                        tracing::debug!("Discarding garbage message ({}): {:?}", rule, message.content);
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }
}

/// Check text against the built-in rules with default settings.
pub fn is_garbage(text: &str) -> bool {
    static DEFAULT: LazyLock<GarbageClassifier> = LazyLock::new(GarbageClassifier::default);
    DEFAULT.is_garbage(text)
}

/// Remove garbage from a message list with default settings.
pub fn filter_garbage(messages: Vec<Message>) -> Vec<Message> {
    GarbageClassifier::default().filter(messages)
}
