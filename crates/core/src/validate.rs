use crate::transcript::{ConversationRecord, Message};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
    #[error("empty content at index {index}")]
    EmptyContent { index: usize },
    #[error("date header at index {index} carries a role")]
    DateHeaderWithRole { index: usize },
    #[error("dialogue message at index {index} has no role")]
    DialogueWithoutRole { index: usize },
    #[error("messages not in chronological order at index {index}")]
    MessagesOutOfOrder { index: usize },
}

/// Validate a reconciled record by composing independent validators.
pub fn validate_record(record: &ConversationRecord) -> Result<(), Vec<ValidationError>> {
    let validators: &[fn(&ConversationRecord) -> Vec<ValidationError>] = &[
        validate_required_fields,
        validate_messages,
        validate_order,
    ];

    let errors: Vec<ValidationError> = validators.iter().flat_map(|v| v(record)).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_required_fields(record: &ConversationRecord) -> Vec<ValidationError> {
    [
        ("session_id", record.session_id.is_empty()),
        ("construct_identity", record.construct_identity.is_empty()),
    ]
    .into_iter()
    .filter(|(_, empty)| *empty)
    .map(|(field, _)| ValidationError::MissingField {
        field: field.to_string(),
    })
    .collect()
}

fn validate_messages(record: &ConversationRecord) -> Vec<ValidationError> {
    record
        .messages
        .iter()
        .enumerate()
        .filter_map(|(index, message)| validate_message(index, message).err())
        .collect()
}

/// Adjacent messages that both carry a timestamp must be non-decreasing.
fn validate_order(record: &ConversationRecord) -> Vec<ValidationError> {
    record
        .messages
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| match (pair[0].timestamp, pair[1].timestamp) {
            (Some(a), Some(b)) if b < a => Some(ValidationError::MessagesOutOfOrder { index: i + 1 }),
            _ => None,
        })
        .collect()
}

/// Validate a single message found at `index`.
pub fn validate_message(index: usize, message: &Message) -> Result<(), ValidationError> {
    if message.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent { index });
    }
    match (message.is_date_header, message.role) {
        (true, Some(_)) => Err(ValidationError::DateHeaderWithRole { index }),
        (false, None) => Err(ValidationError::DialogueWithoutRole { index }),
        _ => Ok(()),
    }
}
