//! HTTP reply to a single interaction.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use hw_common::{
    InteractionResponse, ResponseData, ACKNOWLEDGE_BODY, PONG_BODY, UNKNOWN_COMMAND_BODY,
};
use serde::Serialize;
use tracing::error;

/// The one response written for an interaction.
///
/// Every dispatch branch produces exactly one of these, so a request can
/// never be answered twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionReply {
    /// `204 No Content`.
    NoContent,
    /// `200 OK` with a JSON body.
    Json(Bytes),
}

impl InteractionReply {
    /// A reply with a pre-encoded body.
    pub const fn raw(body: &'static [u8]) -> Self {
        Self::Json(Bytes::from_static(body))
    }

    pub const fn pong() -> Self {
        Self::raw(PONG_BODY)
    }

    /// Acknowledges a component or modal without changing anything.
    pub const fn acknowledge() -> Self {
        Self::raw(ACKNOWLEDGE_BODY)
    }

    pub const fn unknown_command() -> Self {
        Self::raw(UNKNOWN_COMMAND_BODY)
    }

    /// Serializes `body` into a JSON reply.
    pub fn try_json<T: Serialize + ?Sized>(body: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(body).map(|bytes| Self::Json(Bytes::from(bytes)))
    }

    /// Serializes `body`, aborting the process if the caller handed over a
    /// value that cannot be encoded.
    pub(crate) fn json_or_abort<T: Serialize + ?Sized>(what: &'static str, body: &T) -> Self {
        match Self::try_json(body) {
            Ok(reply) => reply,
            Err(e) => {
                error!(what, error = %e, "Handler produced an unserializable response");
                std::process::abort();
            }
        }
    }

    /// A visible message reply.
    pub fn message(data: ResponseData) -> Self {
        Self::json_or_abort("message", &InteractionResponse::message(data))
    }

    /// Replaces the message the component is attached to.
    pub fn update(data: ResponseData) -> Self {
        Self::json_or_abort("update", &InteractionResponse::update(data))
    }

    pub const fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// The JSON body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::NoContent => None,
            Self::Json(bytes) => Some(&bytes[..]),
        }
    }
}

impl IntoResponse for InteractionReply {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::Json(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_reply_sets_content_type() {
        let response = InteractionReply::pong().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_no_content_has_no_body_type() {
        let response = InteractionReply::NoContent.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_message_wraps_data() {
        let reply = InteractionReply::message(ResponseData::ephemeral("hi"));
        let json: serde_json::Value = serde_json::from_slice(reply.body().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": 4, "data": {"content": "hi", "flags": 64}})
        );
    }
}
