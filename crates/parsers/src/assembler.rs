//! Line-by-line message assembly as an explicit state machine.
//!
//! The transcript parser turns each line into a [`Cue`]; [`Assembler::step`]
//! folds cues into messages. The only state is [`AssemblerState`].

use crate::garbage::GarbageClassifier;
use chatty_core::{Message, Role};
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssemblerState {
    /// No open message; non-matching lines are preamble and ignored.
    #[default]
    Idle,
    /// Accumulating continuation lines for one message.
    Open {
        role: Role,
        lines: Vec<String>,
        timestamp: Option<DateTime<FixedOffset>>,
    },
}

/// One classified input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Calendar-day marker. Carries the date-header message for bare markers.
    DateHeader(Option<Message>),
    /// Message-start line. `role: None` means the speaker policy drops the turn.
    Start {
        role: Option<Role>,
        inline: Option<String>,
        timestamp: Option<DateTime<FixedOffset>>,
    },
    /// Separator line (`---`); closes the open message.
    Terminator,
    Continuation(String),
    Blank,
    End,
}

pub struct Assembler<'a> {
    garbage: &'a GarbageClassifier,
}

impl<'a> Assembler<'a> {
    pub fn new(garbage: &'a GarbageClassifier) -> Self {
        Self { garbage }
    }

    /// Apply one cue. Returns the next state and any messages emitted, in order.
    pub fn step(&self, state: AssemblerState, cue: Cue) -> (AssemblerState, Vec<Message>) {
        match cue {
            Cue::DateHeader(header) => {
                let mut emitted: Vec<Message> = self.close(state).into_iter().collect();
                emitted.extend(header);
                (AssemblerState::Idle, emitted)
            }
            Cue::Start {
                role,
                inline,
                timestamp,
            } => {
                let emitted = self.close(state).into_iter().collect();
                let next = match role {
                    Some(role) => AssemblerState::Open {
                        role,
                        lines: inline.into_iter().collect(),
                        timestamp,
                    },
                    None => AssemblerState::Idle,
                };
                (next, emitted)
            }
            Cue::Terminator | Cue::End => (AssemblerState::Idle, self.close(state).into_iter().collect()),
            Cue::Continuation(line) => match state {
                AssemblerState::Open {
                    role,
                    mut lines,
                    timestamp,
                } => {
                    lines.push(line);
                    (
                        AssemblerState::Open {
                            role,
                            lines,
                            timestamp,
                        },
                        Vec::new(),
                    )
                }
                AssemblerState::Idle => {
                    tracing::debug!("Ignoring preamble line: {:?}", line);
                    (AssemblerState::Idle, Vec::new())
                }
            },
            Cue::Blank => match state {
                AssemblerState::Open {
                    role,
                    mut lines,
                    timestamp,
                } => {
                    if lines.last().is_some_and(|l| !l.is_empty()) {
                        lines.push(String::new());
                    }
                    (
                        AssemblerState::Open {
                            role,
                            lines,
                            timestamp,
                        },
                        Vec::new(),
                    )
                }
                AssemblerState::Idle => (AssemblerState::Idle, Vec::new()),
            },
        }
    }

    /// Fold a cue sequence, closing any open message at the end.
    pub fn run(&self, cues: impl IntoIterator<Item = Cue>) -> Vec<Message> {
        let mut state = AssemblerState::Idle;
        let mut out = Vec::new();
        for cue in cues.into_iter().chain(std::iter::once(Cue::End)) {
            let (next, emitted) = self.step(state, cue);
            state = next;
            out.extend(emitted);
        }
        out
    }

    /// Join, trim and garbage-check the open message.
    fn close(&self, state: AssemblerState) -> Option<Message> {
        let AssemblerState::Open {
            role,
            lines,
            timestamp,
        } = state
        else {
            return None;
        };
        let content = lines.join("\n").trim().to_string();
        if let Some(rule) = self.garbage.classify(&content) {
            tracing::debug!("Rejected {} message ({}): {:?}", role, rule, content);
            return None;
        }
        Some(Message::dialogue(role, content).with_timestamp(timestamp))
    }
}
