//! Realtime channel messages.
//!
//! Every `WebSocket` text frame is a JSON object of the form
//! `{ "type": "<kebab-case-name>", "data": { ... } }`. [`ClientEvent`] is
//! what browsers send, [`ServerEvent`] is what the server pushes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{OptionSelector, RejectionReason};
use crate::view::PollView;

/// A connected student as shown in the participant sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// The name the student registered with.
    pub name: String,
}

/// A relayed chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Sender's display name.
    pub name: String,
    /// Message body.
    pub message: String,
    /// When the server relayed the message.
    pub timestamp: DateTime<Utc>,
}

/// Reply sent only to the client whose vote was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteRejectedNotice {
    /// Machine-readable reason.
    pub reason: RejectionReason,
    /// Human-readable explanation.
    pub message: String,
}

/// Messages a client may send over the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join the participant roster under `name`.
    RegisterStudent {
        /// Student display name.
        name: String,
    },
    /// Cast a vote on the current poll.
    #[serde(rename_all = "camelCase")]
    Vote {
        /// Voting student's name.
        student_name: String,
        /// The chosen option.
        #[serde(alias = "selectedOption", alias = "optionIndex")]
        option: OptionSelector,
    },
    /// Relay a chat line to everyone.
    ChatMessage {
        /// Sender's display name.
        name: String,
        /// Message body.
        message: String,
    },
    /// Ask for the current participant list.
    GetStudentList,
    /// Remove a student from the session.
    KickStudent {
        /// Name of the student to remove.
        name: String,
    },
}

/// Messages the server pushes over the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A new poll was created and is now active.
    PollStarted(PollView),
    /// A vote was accepted; carries the recomputed tally.
    PollUpdated(PollView),
    /// The participant roster changed (or was requested).
    StudentList(Vec<Participant>),
    /// A chat line relayed to everyone.
    ChatBroadcast(ChatMessage),
    /// The named student was removed by the teacher.
    Kicked {
        /// Name of the removed student.
        name: String,
    },
    /// The sender's vote was refused.
    VoteRejected(VoteRejectedNotice),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_vote_frame_parses() {
        let frame = r#"{"type":"vote","data":{"studentName":"ana","option":"Paris"}}"#;
        let event: Result<ClientEvent, _> = serde_json::from_str(frame);
        assert_eq!(
            event.ok(),
            Some(ClientEvent::Vote {
                student_name: String::from("ana"),
                option: OptionSelector::Text(String::from("Paris")),
            })
        );
    }

    #[test]
    fn client_vote_frame_accepts_legacy_field_names() {
        let frame = r#"{"type":"vote","data":{"studentName":"ana","selectedOption":"Paris"}}"#;
        let event: Result<ClientEvent, _> = serde_json::from_str(frame);
        assert_eq!(
            event.ok(),
            Some(ClientEvent::Vote {
                student_name: String::from("ana"),
                option: OptionSelector::Text(String::from("Paris")),
            })
        );

        let frame = r#"{"type":"vote","data":{"studentName":"ana","optionIndex":1}}"#;
        let event: Result<ClientEvent, _> = serde_json::from_str(frame);
        assert_eq!(
            event.ok(),
            Some(ClientEvent::Vote {
                student_name: String::from("ana"),
                option: OptionSelector::Index(1),
            })
        );
    }

    #[test]
    fn unit_client_frame_parses_without_data() {
        let event: Result<ClientEvent, _> = serde_json::from_str(r#"{"type":"get-student-list"}"#);
        assert_eq!(event.ok(), Some(ClientEvent::GetStudentList));
    }

    #[test]
    fn server_frame_uses_kebab_case_tag() {
        let event = ServerEvent::StudentList(vec![Participant {
            name: String::from("ana"),
        }]);
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "student-list");
        assert_eq!(json["data"][0]["name"], "ana");
    }
}
