//! Submission/reply cycle for a single conversation.
//!
//! `ChatSession` owns the transcript and the in-flight flag. Callers drive it in
//! two steps: `submit` records the user's message and says whether a request
//! should go out, and `complete` applies whatever the request produced.

use crate::predict::{PredictError, PredictionClient};
use crate::state::{Message, Transcript};

/// Result of handing raw composer text to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Input was empty after trimming. Nothing changed.
    Empty,
    /// A request is already in flight. Nothing changed.
    Busy,
    /// A user message was appended; the caller must send this text exactly once.
    Dispatched(String),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    pending: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn submit(&mut self, raw: &str) -> Submission {
        if self.pending {
            tracing::debug!("submission ignored while a request is pending");
            return Submission::Busy;
        }

        let text = raw.trim();
        if text.is_empty() {
            return Submission::Empty;
        }

        self.transcript.push(Message::user(text));
        self.pending = true;
        Submission::Dispatched(text.to_string())
    }

    /// Apply the outcome of the request started by the last `Dispatched` submit.
    /// Success and failure both return the session to idle.
    pub fn complete(&mut self, outcome: Result<String, PredictError>) {
        match outcome {
            Ok(text) => self.transcript.push(Message::reply(text)),
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "prediction failed, no reply added");
            }
        }
        self.pending = false;
    }

    /// Submit, await the prediction and apply it in one go.
    pub async fn exchange(&mut self, client: &PredictionClient, raw: &str) -> Submission {
        let submission = self.submit(raw);
        if let Submission::Dispatched(text) = &submission {
            let outcome = client.predict(text).await;
            self.complete(outcome);
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sender;

    #[test]
    fn test_whitespace_submission_is_noop() {
        let mut session = ChatSession::new();
        for raw in ["", "   ", "\n\t  "] {
            assert_eq!(session.submit(raw), Submission::Empty);
        }
        assert!(session.transcript().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_submit_appends_trimmed_user_message() {
        let mut session = ChatSession::new();
        let submission = session.submit("  Q  ");

        assert_eq!(submission, Submission::Dispatched("Q".to_string()));
        assert_eq!(session.transcript().len(), 1);
        let message = &session.transcript().messages()[0];
        assert_eq!(message.sender(), Sender::User);
        assert_eq!(message.text(), "Q");
        assert!(session.is_pending());
    }

    #[test]
    fn test_submit_while_pending_is_ignored() {
        let mut session = ChatSession::new();
        session.submit("first");

        assert_eq!(session.submit("second"), Submission::Busy);
        assert_eq!(session.transcript().len(), 1);
        assert!(session.is_pending());
    }

    #[test]
    fn test_complete_success_appends_reply() {
        let mut session = ChatSession::new();
        session.submit("Q");
        session.complete(Ok("A".to_string()));

        assert_eq!(session.transcript().len(), 2);
        let reply = &session.transcript().messages()[1];
        assert_eq!(reply.sender(), Sender::Reply);
        assert_eq!(reply.text(), "A");
        assert!(!session.is_pending());
    }

    #[test]
    fn test_complete_failure_leaves_transcript() {
        let mut session = ChatSession::new();
        session.submit("Q");
        let len_after_submit = session.transcript().len();

        session.complete(Err(PredictError::MissingField));

        assert_eq!(session.transcript().len(), len_after_submit);
        assert!(!session.is_pending());
        assert_eq!(session.submit("again"), Submission::Dispatched("again".to_string()));
    }

    #[test]
    fn test_user_message_precedes_reply() {
        let mut session = ChatSession::new();
        for (question, answer) in [("q1", "a1"), ("q2", "a2")] {
            session.submit(question);
            session.complete(Ok(answer.to_string()));
        }

        let texts: Vec<&str> = session.transcript().iter().map(Message::text).collect();
        assert_eq!(texts, ["q1", "a1", "q2", "a2"]);
    }
}
