// ABOUTME: Web API client for auxiliary request/response operations
// ABOUTME: Opens conversations, posts messages, and lists channels and users outside the stream

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::wire::{
    ChannelListResponse, Conversation, ImOpenResponse, Member, MpimOpenResponse, UserListResponse,
};
use serde::de::DeserializeOwned;

/// Thin request/decode wrappers over the Web API.
///
/// These are collaborators for handler bodies; the dispatch core never
/// depends on them. Every call fails with [`Error::Api`] on a non-success
/// status, a body that does not decode, or an `ok: false` response.
pub struct ApiClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.token.clone(),
            base_url: config.api_base_url.clone(),
        }
    }

    /// Open a direct conversation with a user.
    pub async fn open_im(&self, user: &str) -> Result<Conversation> {
        let request = self
            .http
            .post(format!("{}/im.open", self.base_url))
            .form(&[
                ("token", self.token.as_str()),
                ("user", user),
                ("return_im", "true"),
            ]);
        let body: ImOpenResponse = self.fetch_json("im.open", request).await?;
        if !body.ok {
            return Err(Error::api(format!("im.open rejected: {}", body.error)));
        }
        Ok(body.channel)
    }

    /// Open a group conversation with a comma-separated set of users.
    pub async fn open_mpim(&self, users: &str) -> Result<Conversation> {
        let request = self
            .http
            .post(format!("{}/mpim.open", self.base_url))
            .form(&[
                ("token", self.token.as_str()),
                ("users", users),
                ("return_im", "true"),
            ]);
        let body: MpimOpenResponse = self.fetch_json("mpim.open", request).await?;
        if !body.ok {
            return Err(Error::api(format!("mpim.open rejected: {}", body.error)));
        }
        Ok(body.group)
    }

    /// Post a message through the Web API rather than the stream.
    pub async fn post_message(&self, channel: &str, text: &str, as_user: bool) -> Result<()> {
        let as_user = as_user.to_string();
        let request = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .form(&[
                ("token", self.token.as_str()),
                ("channel", channel),
                ("text", text),
                ("as_user", as_user.as_str()),
            ]);
        let response = request
            .send()
            .await
            .map_err(|e| Error::api(format!("chat.postMessage request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(format!(
                "chat.postMessage returned status {status}"
            )));
        }
        Ok(())
    }

    /// List channels visible to the bot.
    pub async fn list_channels(&self) -> Result<Vec<Conversation>> {
        let request = self
            .http
            .get(format!("{}/channels.list", self.base_url))
            .query(&[("token", self.token.as_str())]);
        let body: ChannelListResponse = self.fetch_json("channels.list", request).await?;
        if !body.ok {
            return Err(Error::api(format!("channels.list rejected: {}", body.error)));
        }
        Ok(body.channels)
    }

    /// List workspace members.
    pub async fn list_users(&self) -> Result<Vec<Member>> {
        let request = self
            .http
            .get(format!("{}/users.list", self.base_url))
            .query(&[("token", self.token.as_str())]);
        let body: UserListResponse = self.fetch_json("users.list", request).await?;
        if !body.ok {
            return Err(Error::api(format!("users.list rejected: {}", body.error)));
        }
        Ok(body.members)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        op: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::api(format!("{op} request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(format!("{op} returned status {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::api(format!("{op} response did not decode: {e}")))
    }
}
