// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

use crate::db::state_repo::ResourceKind;
use crate::validation::ValidationError;

/// Failure before any HTTP response was received (DNS, connect, TLS, body read).
#[derive(Debug, Error)]
#[error("request failed: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TransportError { source: err.into() }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::new(err)
    }
}

/// Error returned by every reconciler and lister operation.
///
/// `op` names the operation that failed, e.g. `"create zone"`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unable to {op}: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("unable to {op}: remote returned {status}")]
    UnexpectedStatus {
        op: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("unable to {op}: malformed response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to {op}: response has no {field}")]
    MissingField {
        op: &'static str,
        field: &'static str,
    },

    #[error("unable to {op}: failed to encode request: {source}")]
    Encode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} changes cannot be applied in place; the remote API has no update endpoint")]
    UpdateUnsupported { kind: &'static str },

    #[error("invalid import identifier '{0}': expected a positive decimal integer")]
    InvalidImportId(String),

    #[error("invalid {field}: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
}

impl ApiError {
    /// Status code of the remote response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid(field: &'static str, source: ValidationError) -> Self {
        ApiError::Invalid { field, source }
    }
}

/// Error returned by the tracked-resource lifecycle in [`crate::Session`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{kind} '{address}' is already tracked as id {remote_id}; use read, update or delete")]
    AlreadyTracked {
        kind: ResourceKind,
        address: String,
        remote_id: i64,
    },

    #[error("no {kind} tracked under '{address}'")]
    NotTracked { kind: ResourceKind, address: String },

    #[error("{kind} {remote_id} does not exist remotely")]
    Vanished { kind: ResourceKind, remote_id: i64 },

    #[error("corrupt state for {kind} '{address}': {source}")]
    Corrupt {
        kind: ResourceKind,
        address: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("state store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
