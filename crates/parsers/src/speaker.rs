//! Maps free-text speaker labels to a role.

use chatty_core::Role;
use chatty_runtime_config::{SpeakerSettings, UnknownSpeakerPolicy};
use std::collections::HashSet;

/// Words that always denote the human side of a transcript.
const USER_WORDS: &[&str] = &["you", "user", "human", "me", "i", "myself"];

/// Result of classifying a label, before the unknown-speaker policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct SpeakerClassifier {
    user_exact: HashSet<String>,
    user_prefixes: Vec<String>,
    assistant_exact: HashSet<String>,
    assistant_prefixes: Vec<String>,
    unknown: UnknownSpeakerPolicy,
}

impl Default for SpeakerClassifier {
    fn default() -> Self {
        Self::new(&SpeakerSettings::default())
    }
}

impl SpeakerClassifier {
    pub fn new(settings: &SpeakerSettings) -> Self {
        let lower = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|v| normalize_label(v))
                .filter(|v| !v.is_empty())
                .collect()
        };
        let mut user_exact: HashSet<String> = USER_WORDS.iter().map(|w| w.to_string()).collect();
        user_exact.extend(lower(&settings.user_aliases));

        Self {
            user_exact,
            user_prefixes: lower(&settings.user_names),
            assistant_exact: lower(&settings.assistant_names).into_iter().collect(),
            assistant_prefixes: lower(&settings.assistant_prefixes),
            unknown: settings.unknown_speaker,
        }
    }

    /// Copy of this classifier that also treats `alias` (a construct name) as
    /// an assistant prefix.
    pub fn with_assistant_alias(&self, alias: &str) -> Self {
        let mut classifier = self.clone();
        let alias = normalize_label(alias);
        if !alias.is_empty() && !classifier.assistant_prefixes.contains(&alias) {
            classifier.assistant_prefixes.push(alias);
        }
        classifier
    }

    pub fn classify(&self, label: &str) -> Speaker {
        let label = normalize_label(label);
        if label.is_empty() {
            return Speaker::Unknown;
        }
        if self.user_exact.contains(&label)
            || self.user_prefixes.iter().any(|p| prefix_matches(&label, p))
        {
            return Speaker::User;
        }
        if self.assistant_exact.contains(&label)
            || self.assistant_prefixes.iter().any(|p| prefix_matches(&label, p))
        {
            return Speaker::Assistant;
        }
        Speaker::Unknown
    }

    /// Role for a label after applying the unknown-speaker policy.
    /// `None` means the turn should be dropped.
    pub fn role_for(&self, label: &str) -> Option<Role> {
        match self.classify(label) {
            Speaker::User => Some(Role::User),
            Speaker::Assistant => Some(Role::Assistant),
            Speaker::Unknown => {
                tracing::debug!("Unrecognized speaker label {:?} ({:?})", label, self.unknown);
                match self.unknown {
                    UnknownSpeakerPolicy::User => Some(Role::User),
                    UnknownSpeakerPolicy::Assistant => Some(Role::Assistant),
                    UnknownSpeakerPolicy::Skip => None,
                }
            }
        }
    }
}

/// Lowercase a label and strip markdown emphasis, brackets and trailing colons.
pub fn normalize_label(label: &str) -> String {
    let stripped = label.trim().trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '_' | '#' | '>' | '[' | ']' | ':' | '`')
    });
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `prefix` matches a label equal to it or continuing with a non-letter,
/// so `zen` matches `zen-001` and `zen (gpt)` but not `zenith`.
fn prefix_matches(label: &str, prefix: &str) -> bool {
    match label.strip_prefix(prefix) {
        Some(rest) => rest.chars().next().is_none_or(|c| !c.is_alphabetic()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_user(name: &str) -> SpeakerSettings {
        SpeakerSettings {
            user_names: vec![name.to_string()],
            ..SpeakerSettings::default()
        }
    }

    #[test]
    fn test_exact_user_words() {
        let classifier = SpeakerClassifier::default();
        for label in ["You", "user", "**Human**", "Me", " I "] {
            assert_eq!(classifier.classify(label), Speaker::User, "{label}");
        }
    }

    #[test]
    fn test_assistant_names_and_prefixes() {
        let classifier = SpeakerClassifier::default();
        for label in ["Assistant", "ChatGPT", "Zen", "Zen-001", "zen (gpt-4o)", "Lin_002", "Claude"] {
            assert_eq!(classifier.classify(label), Speaker::Assistant, "{label}");
        }
    }

    #[test]
    fn test_prefix_does_not_match_mid_word() {
        let classifier = SpeakerClassifier::default();
        assert_eq!(classifier.classify("Zenith"), Speaker::Unknown);
        assert_eq!(classifier.classify("Linda"), Speaker::Unknown);
    }

    #[test]
    fn test_configured_user_names() {
        let classifier = SpeakerClassifier::new(&settings_with_user("Devon"));
        assert_eq!(classifier.classify("Devon"), Speaker::User);
        assert_eq!(classifier.classify("Devon R."), Speaker::User);
        assert_eq!(classifier.classify("Devonshire"), Speaker::Unknown);
    }

    #[test]
    fn test_unknown_defaults_to_user() {
        let classifier = SpeakerClassifier::default();
        assert_eq!(classifier.classify("Mystery"), Speaker::Unknown);
        assert_eq!(classifier.role_for("Mystery"), Some(Role::User));
    }

    #[test]
    fn test_unknown_policy_is_configurable() {
        let assistant = SpeakerClassifier::new(&SpeakerSettings {
            unknown_speaker: UnknownSpeakerPolicy::Assistant,
            ..SpeakerSettings::default()
        });
        assert_eq!(assistant.role_for("Mystery"), Some(Role::Assistant));

        let skip = SpeakerClassifier::new(&SpeakerSettings {
            unknown_speaker: UnknownSpeakerPolicy::Skip,
            ..SpeakerSettings::default()
        });
        assert_eq!(skip.role_for("Mystery"), None);
        assert_eq!(skip.role_for("You"), Some(Role::User));
    }

    #[test]
    fn test_construct_alias() {
        let classifier = SpeakerClassifier::default().with_assistant_alias("Sera");
        assert_eq!(classifier.classify("Sera"), Speaker::Assistant);
        assert_eq!(classifier.classify("sera-003"), Speaker::Assistant);
        assert_eq!(SpeakerClassifier::default().classify("Sera"), Speaker::Unknown);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  **Zen  Bot**: "), "zen bot");
        assert_eq!(normalize_label("[You]"), "you");
        assert_eq!(normalize_label(""), "");
    }
}
