use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateContactRequest {
    pub inbox_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<Value>,
}

impl CreateContactRequest {
    pub fn new(inbox_id: i64) -> Self {
        Self { inbox_id, ..Self::default() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateContactResponse {
    pub payload: ContactPayload,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactPayload {
    pub contact: Contact,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Contact {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub contact_inboxes: Vec<ContactInbox>,
}

impl Contact {
    /// Source id of the most recently attached inbox, used to open conversations for this contact.
    pub fn source_id(&self) -> Option<&str> {
        self.contact_inboxes.last().map(|ci| ci.source_id.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactInbox {
    pub source_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Resolved,
    Pending,
    Snoozed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateConversationRequest {
    pub source_id: String,
    pub inbox_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CreateConversationResponse {
    pub id: i64,
    pub account_id: i64,
    pub inbox_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessagesResponse {
    #[serde(default)]
    pub meta: Value,
    pub payload: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Incoming,
    Outgoing,
}

/// Minimal create-message body.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateMessageRequest {
    pub content: String,
    pub message_type: MessageType,
    pub private: bool,
}

impl CreateMessageRequest {
    pub fn new(content: impl Into<String>, message_type: MessageType, private: bool) -> Self {
        Self {
            content: content.into(),
            message_type,
            private,
        }
    }

    pub fn outgoing(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Outgoing, false)
    }

    pub fn incoming(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Incoming, false)
    }
}

/// `message_type` as returned by the server. Chatwoot 2.x sends the integer code
/// even though the API documentation describes a string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageTypeCode {
    Code(i64),
    Name(String),
}

impl MessageTypeCode {
    pub fn is_outgoing(&self) -> bool {
        match self {
            MessageTypeCode::Code(code) => *code == 1,
            MessageTypeCode::Name(name) => name == "outgoing",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateMessageResponse {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    pub message_type: MessageTypeCode,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddLabelsRequest {
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AssignmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_request_omits_unset_fields() {
        let req = CreateContactRequest {
            name: Some("Unit Test Contact".into()),
            ..CreateContactRequest::new(1)
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "inbox_id": 1, "name": "Unit Test Contact" }));
    }

    #[test]
    fn contact_source_id_is_last_inbox() {
        let resp: CreateContactResponse = serde_json::from_value(json!({
            "payload": { "contact": {
                "id": 7,
                "contact_inboxes": [ { "source_id": "a" }, { "source_id": "42" } ]
            } }
        }))
        .unwrap();
        assert_eq!(resp.payload.contact.source_id(), Some("42"));
    }

    #[test]
    fn conversation_status_is_lowercase() {
        let req = CreateConversationRequest {
            source_id: "src".into(),
            inbox_id: 3,
            contact_id: None,
            status: Some(ConversationStatus::Pending),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "source_id": "src", "inbox_id": 3, "status": "pending" }));
    }

    #[test]
    fn message_request_shape() {
        let value = serde_json::to_value(CreateMessageRequest::new("hi", MessageType::Outgoing, true)).unwrap();
        assert_eq!(value, json!({ "content": "hi", "message_type": "outgoing", "private": true }));

        let incoming = CreateMessageRequest::incoming("from customer");
        assert_eq!(incoming.message_type, MessageType::Incoming);
        assert!(!incoming.private);
        assert_eq!(CreateMessageRequest::outgoing("x").message_type, MessageType::Outgoing);
    }

    #[test]
    fn message_type_accepts_code_or_name() {
        let by_code: CreateMessageResponse =
            serde_json::from_value(json!({ "id": 1, "content": "x", "message_type": 1, "private": false })).unwrap();
        assert!(by_code.message_type.is_outgoing());

        let by_name: CreateMessageResponse =
            serde_json::from_value(json!({ "id": 2, "content": null, "message_type": "incoming" })).unwrap();
        assert_eq!(by_name.message_type, MessageTypeCode::Name("incoming".into()));
        assert!(!by_name.private);
        assert!(by_name.content.is_none());
    }

    #[test]
    fn assignment_serializes_only_set_field() {
        let agent = AssignmentRequest { assignee_id: Some(5), ..Default::default() };
        assert_eq!(serde_json::to_value(&agent).unwrap(), json!({ "assignee_id": 5 }));
        let team = AssignmentRequest { team_id: Some(9), ..Default::default() };
        assert_eq!(serde_json::to_value(&team).unwrap(), json!({ "team_id": 9 }));
    }
}
