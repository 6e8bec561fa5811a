//! Client-side transcript accumulation.
//!
//! A streamed reply arrives as a run of text deltas. [`reduce`] folds them
//! into a conversation: deltas extend the trailing assistant message, and
//! only that one.

use crate::message::{Message, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// The user submitted a new message.
    User(String),
    /// A chunk of the assistant's streamed reply.
    AssistantDelta(String),
}

/// Apply one event to a transcript and return the new transcript.
pub fn reduce(mut transcript: Vec<Message>, event: TranscriptEvent) -> Vec<Message> {
    match event {
        TranscriptEvent::User(content) => transcript.push(Message::user(content)),
        TranscriptEvent::AssistantDelta(delta) if delta.is_empty() => {}
        TranscriptEvent::AssistantDelta(delta) => match transcript.last_mut() {
            Some(last) if last.role == Role::Assistant => last.content.push_str(&delta),
            _ => transcript.push(Message::assistant(delta)),
        },
    }
    transcript
}
