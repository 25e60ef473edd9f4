// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Error taxonomy shared across the Fortinet state engine and the ESP
//! datapath. Collaborator boundaries (client::collaborators) and the public
//! `connect`/`teardown` entry points return this type; internals keep using
//! `anyhow` the way the rest of the crate does and convert at the boundary.

use core::fmt;

use thiserror::Error;

/// Top-level error type returned across collaborator boundaries.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The user (or a local policy) aborted an in-progress auth prompt.
    #[error("cancelled by user")]
    Cancelled,

    /// Tunnel-config XML was missing, unreadable, or had no root element.
    #[error("invalid tunnel configuration: {0}")]
    InvalidConfig(String),

    /// Server redirected back to login; the session cookie is no longer
    /// valid and the caller must re-authenticate.
    #[error("session cookie rejected, re-authentication required")]
    InvalidCookie,

    /// Socket or TLS/DTLS transport failure. Callers may retry.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Cipher initialization, encrypt, or HMAC failure in the ESP engine.
    #[error("crypto error: {0}")]
    CryptoError(String),

    /// Inbound ESP packet rejected by the anti-replay window. Non-fatal.
    #[error("replayed packet rejected")]
    Replay,

    /// Malformed svrhello frame or unexpected HTTP status from the server.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// Allocation failure while parsing the tunnel config.
    #[error("out of memory")]
    OutOfMemory,
}

impl CoreError {
    /// Shorthand for building an [`CoreError::InvalidConfig`] from a
    /// `Display`-able cause.
    pub fn invalid_config(cause: impl fmt::Display) -> Self {
        CoreError::InvalidConfig(cause.to_string())
    }

    /// Shorthand for building an [`CoreError::ProtocolError`].
    pub fn protocol(cause: impl fmt::Display) -> Self {
        CoreError::ProtocolError(cause.to_string())
    }

    /// Shorthand for building an [`CoreError::TransportError`].
    pub fn transport(cause: impl fmt::Display) -> Self {
        CoreError::TransportError(cause.to_string())
    }

    /// Shorthand for building an [`CoreError::CryptoError`].
    pub fn crypto(cause: impl fmt::Display) -> Self {
        CoreError::CryptoError(cause.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
