//! Path extractors for the Conversations API

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use bahl_common::Error;

use crate::domain::entities::ConversationId;

/// `{id}` path segment parsed into a [`ConversationId`].
///
/// Undecodable segments and malformed ids both reject with the JSON
/// `INVALID_ID` error instead of axum's plain-text path rejection.
#[derive(Debug, Clone, Copy)]
pub struct ConversationPath(pub ConversationId);

impl<S> FromRequestParts<S> for ConversationPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::InvalidId(e.body_text()))?;
        Ok(Self(raw.parse()?))
    }
}
