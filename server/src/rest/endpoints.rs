//! Typed wrappers over the handful of endpoints the server uses.

use std::time::Instant;

use hw_common::{ApplicationCommandPayload, Member, Message, ResponseData, Snowflake, User};
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::{RestClient, RestError};

/// Decode a JSON response body.
fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, RestError> {
    serde_json::from_slice(raw).map_err(RestError::Decode)
}

impl RestClient {
    /// Round-trip time of a cheap API call, in milliseconds.
    pub async fn latency(&self) -> Result<u128, RestError> {
        let start = Instant::now();
        self.request_empty(Method::GET, "/gateway").await?;
        Ok(start.elapsed().as_millis())
    }

    pub async fn fetch_user(&self, user_id: Snowflake) -> Result<User, RestError> {
        let raw = self
            .request_empty(Method::GET, &format!("/users/{user_id}"))
            .await?;
        decode(&raw)
    }

    pub async fn fetch_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Member, RestError> {
        let raw = self
            .request_empty(Method::GET, &format!("/guilds/{guild_id}/members/{user_id}"))
            .await?;
        decode(&raw)
    }

    pub async fn send_message(
        &self,
        channel_id: Snowflake,
        message: &Message,
    ) -> Result<Message, RestError> {
        let raw = self
            .request(
                Method::POST,
                &format!("/channels/{channel_id}/messages"),
                Some(message),
            )
            .await?;
        decode(&raw)
    }

    /// Sends a plain text message that will not be edited later.
    pub async fn send_linear_message(
        &self,
        channel_id: Snowflake,
        content: &str,
    ) -> Result<Message, RestError> {
        self.send_message(channel_id, &Message::text(content)).await
    }

    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: &Message,
    ) -> Result<(), RestError> {
        self.request(
            Method::PATCH,
            &format!("/channels/{channel_id}/messages/{message_id}"),
            Some(message),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), RestError> {
        self.request_empty(
            Method::DELETE,
            &format!("/channels/{channel_id}/messages/{message_id}"),
        )
        .await?;
        Ok(())
    }

    /// Publishes a message from an announcement channel to its followers.
    pub async fn crosspost_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), RestError> {
        self.request_empty(
            Method::POST,
            &format!("/channels/{channel_id}/messages/{message_id}/crosspost"),
        )
        .await?;
        Ok(())
    }

    /// Replaces the application's commands, globally or for one guild.
    pub async fn bulk_overwrite_commands(
        &self,
        application_id: Snowflake,
        guild_id: Option<Snowflake>,
        commands: &[ApplicationCommandPayload],
    ) -> Result<(), RestError> {
        let route = match guild_id {
            Some(guild_id) => {
                format!("/applications/{application_id}/guilds/{guild_id}/commands")
            }
            None => format!("/applications/{application_id}/commands"),
        };
        self.request(Method::PUT, &route, Some(commands)).await?;
        Ok(())
    }

    /// Sends a follow-up message for an interaction.
    pub async fn create_followup(
        &self,
        application_id: Snowflake,
        token: &str,
        data: &ResponseData,
    ) -> Result<Message, RestError> {
        let raw = self
            .request(
                Method::POST,
                &format!("/webhooks/{application_id}/{token}"),
                Some(data),
            )
            .await?;
        decode(&raw)
    }

    /// Edits the original response of an interaction.
    pub async fn edit_original_response(
        &self,
        application_id: Snowflake,
        token: &str,
        data: &ResponseData,
    ) -> Result<(), RestError> {
        self.request(
            Method::PATCH,
            &format!("/webhooks/{application_id}/{token}/messages/@original"),
            Some(data),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::rest::client::tests::{client_with, ok, ScriptedTransport};

    #[tokio::test]
    async fn test_fetch_user_decodes() {
        let transport = ScriptedTransport::new([ok(200, r#"{"id":"42","username":"hook","bot":true}"#)]);
        let client = client_with(transport.clone(), Duration::from_millis(1));

        let user = client.fetch_user(Snowflake(42)).await.unwrap();
        assert_eq!(user.username, "hook");
        assert!(user.bot);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1.url, "https://api.test/v10/users/42");
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let transport = ScriptedTransport::new([ok(200, "not json")]);
        let client = client_with(transport, Duration::from_millis(1));

        let err = client.fetch_member(Snowflake(1), Snowflake(2)).await.unwrap_err();
        assert!(matches!(err, RestError::Decode(_)));
    }

    #[tokio::test]
    async fn test_message_routes_have_separators() {
        let transport = ScriptedTransport::new([ok(204, ""), ok(204, "")]);
        let client = client_with(transport.clone(), Duration::from_millis(1));

        client.delete_message(Snowflake(5), Snowflake(6)).await.unwrap();
        client.crosspost_message(Snowflake(5), Snowflake(6)).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1.url, "https://api.test/v10/channels/5/messages/6");
        assert_eq!(calls[0].1.method, Method::DELETE);
        assert_eq!(
            calls[1].1.url,
            "https://api.test/v10/channels/5/messages/6/crosspost"
        );
    }

    #[tokio::test]
    async fn test_bulk_overwrite_targets_guild_or_global() {
        let transport = ScriptedTransport::new([ok(200, "[]"), ok(200, "[]")]);
        let client = client_with(transport.clone(), Duration::from_millis(1));

        client
            .bulk_overwrite_commands(Snowflake(1), None, &[])
            .await
            .unwrap();
        client
            .bulk_overwrite_commands(Snowflake(1), Some(Snowflake(7)), &[])
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1.url, "https://api.test/v10/applications/1/commands");
        assert_eq!(
            calls[1].1.url,
            "https://api.test/v10/applications/1/guilds/7/commands"
        );
        assert_eq!(calls[1].1.body.as_deref(), Some("[]"));
    }
}
