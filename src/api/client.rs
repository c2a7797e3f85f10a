use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::attachment::Attachment;
use crate::api::models::{
    AddLabelsRequest, AssignmentRequest, CreateContactRequest, CreateContactResponse,
    CreateConversationRequest, CreateConversationResponse, CreateMessageRequest,
    CreateMessageResponse, Message, MessageType, MessagesResponse,
};
use crate::error::{Error, Result};
use crate::utils::normalize_base_url;

const TOKEN_HEADER: &str = "api_access_token";

/// Thin async binding over the Chatwoot application API.
///
/// Tokens are passed per call. Some operations (labels, assignments) are blocked
/// for Agent Bot tokens and need an agent's personal token; the rest accept either.
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    http: HttpClient,
    base_url: String,
}

impl ChatwootClient {
    /// Client for `base_url` with a default `reqwest` transport.
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(base_url, HttpClient::new())
    }

    /// Client for `base_url` that sends through the caller's `reqwest::Client` (timeouts, proxies, TLS).
    pub fn with_http_client(base_url: &str, http: HttpClient) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn account_url(&self, account_id: i64, path: &str) -> String {
        format!("{}/api/v1/accounts/{}/{}", self.base_url, account_id, path)
    }

    fn conversation_url(&self, account_id: i64, conversation_id: i64, path: &str) -> String {
        self.account_url(account_id, &format!("conversations/{}/{}", conversation_id, path))
    }

    fn with_auth(req: RequestBuilder, token: &str) -> RequestBuilder {
        req.header(TOKEN_HEADER, token)
    }

    fn require_agent_token(token: &str, action: &'static str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::MissingAgentToken { action });
        }
        Ok(())
    }

    async fn execute(req: RequestBuilder) -> Result<reqwest::Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let url = resp.url().clone();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::debug!("could not read error body from {}: {}", url, e);
                    String::new()
                }
            };
            log::warn!("{} returned {}", url, status);
            return Err(Error::Status { status, body });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let resp = Self::execute(req).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn create_contact(
        &self,
        account_id: i64,
        agent_token: &str,
        request: &CreateContactRequest,
    ) -> Result<CreateContactResponse> {
        let url = self.account_url(account_id, "contacts");
        log::debug!("POST {}", url);
        let req = Self::with_auth(self.http.post(&url).json(request), agent_token);
        Self::send_json(req).await
    }

    pub async fn create_conversation(
        &self,
        account_id: i64,
        token: &str,
        request: &CreateConversationRequest,
    ) -> Result<CreateConversationResponse> {
        let url = self.account_url(account_id, "conversations");
        log::debug!("POST {}", url);
        let req = Self::with_auth(self.http.post(&url).json(request), token);
        Self::send_json(req).await
    }

    /// Messages of a conversation, unwrapped from the `payload` envelope.
    pub async fn get_messages(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
    ) -> Result<Vec<Message>> {
        let url = self.conversation_url(account_id, conversation_id, "messages");
        log::debug!("GET {}", url);
        let req = Self::with_auth(self.http.get(&url), token);
        let resp: MessagesResponse = Self::send_json(req).await?;
        Ok(resp.payload)
    }

    pub async fn create_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        request: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse> {
        let url = self.conversation_url(account_id, conversation_id, "messages");
        log::debug!("POST {}", url);
        let req = Self::with_auth(self.http.post(&url).json(request), token);
        Self::send_json(req).await
    }

    pub async fn create_outgoing_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        content: &str,
    ) -> Result<CreateMessageResponse> {
        let request = CreateMessageRequest::new(content, MessageType::Outgoing, false);
        self.create_message(account_id, conversation_id, token, &request).await
    }

    pub async fn create_outgoing_private_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        content: &str,
    ) -> Result<CreateMessageResponse> {
        let request = CreateMessageRequest::new(content, MessageType::Outgoing, true);
        self.create_message(account_id, conversation_id, token, &request).await
    }

    pub async fn create_incoming_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        content: &str,
    ) -> Result<CreateMessageResponse> {
        let request = CreateMessageRequest::new(content, MessageType::Incoming, false);
        self.create_message(account_id, conversation_id, token, &request).await
    }

    pub async fn create_incoming_private_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        content: &str,
    ) -> Result<CreateMessageResponse> {
        let request = CreateMessageRequest::new(content, MessageType::Incoming, true);
        self.create_message(account_id, conversation_id, token, &request).await
    }

    pub async fn add_labels(
        &self,
        account_id: i64,
        conversation_id: i64,
        agent_token: &str,
        labels: &[String],
    ) -> Result<()> {
        Self::require_agent_token(agent_token, "adding labels")?;
        let url = self.conversation_url(account_id, conversation_id, "labels");
        log::debug!("POST {}", url);
        let body = AddLabelsRequest { labels: labels.to_vec() };
        Self::execute(Self::with_auth(self.http.post(&url).json(&body), agent_token)).await?;
        Ok(())
    }

    pub async fn add_label(
        &self,
        account_id: i64,
        conversation_id: i64,
        agent_token: &str,
        label: &str,
    ) -> Result<()> {
        self.add_labels(account_id, conversation_id, agent_token, &[label.to_string()])
            .await
    }

    /// Assign the conversation to an agent.
    pub async fn assign(
        &self,
        account_id: i64,
        conversation_id: i64,
        agent_token: &str,
        assignee_id: i64,
    ) -> Result<()> {
        let body = AssignmentRequest { assignee_id: Some(assignee_id), ..Default::default() };
        self.post_assignment(account_id, conversation_id, agent_token, &body).await
    }

    /// Assign the conversation to a team.
    pub async fn assign_team(
        &self,
        account_id: i64,
        conversation_id: i64,
        agent_token: &str,
        team_id: i64,
    ) -> Result<()> {
        let body = AssignmentRequest { team_id: Some(team_id), ..Default::default() };
        self.post_assignment(account_id, conversation_id, agent_token, &body).await
    }

    async fn post_assignment(
        &self,
        account_id: i64,
        conversation_id: i64,
        agent_token: &str,
        body: &AssignmentRequest,
    ) -> Result<()> {
        Self::require_agent_token(agent_token, "adding assignments")?;
        let url = self.conversation_url(account_id, conversation_id, "assignments");
        log::debug!("POST {}", url);
        Self::execute(Self::with_auth(self.http.post(&url).json(body), agent_token)).await?;
        Ok(())
    }

    /// Post a message carrying one file, with an optional text caption.
    pub async fn send_attachment_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        attachment: &Attachment,
        content: Option<&str>,
    ) -> Result<CreateMessageResponse> {
        let url = self.conversation_url(account_id, conversation_id, "messages");
        log::debug!(
            "POST {} (multipart, {} as {})",
            url,
            attachment.file_name,
            attachment.mime_type
        );
        let form = attachment.clone().into_form(content)?;
        let req = Self::with_auth(self.http.post(&url).multipart(form), token);
        Self::send_json(req).await
    }

    /// Fetch the image at `image_url` and post it to the conversation as an attachment.
    pub async fn send_image_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        token: &str,
        image_url: &str,
    ) -> Result<CreateMessageResponse> {
        let attachment = Attachment::fetch(&self.http, image_url).await?;
        self.send_attachment_message(account_id, conversation_id, token, &attachment, None)
            .await
    }
}
