// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Collaborator traits the core drives but does not implement. Production
//! binaries wire these to a real HTTP client, a PPP stack, a TLS transport,
//! a UI, and an OTP token generator; tests use fakes.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{error::Result, models::auth_form::AuthForm};

/// HTTP methods the core issues against the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Follows redirects and updates the cookie jar; the core never touches
/// sockets directly.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        content_type: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<(u16, Vec<u8>)>;

    /// Reads a cookie out of the jar the collaborator maintains internally;
    /// the jar is mutated only by this collaborator, the core only ever
    /// reads it.
    fn cookie(&self, name: &str) -> Option<String>;

    /// URL the last request landed on after following redirects, used to
    /// discover the `realm` query parameter on the initial `GET /`.
    fn last_url(&self) -> Option<String>;
}

/// PPP lifecycle control, owned by the OS-adapter collaborator.
#[async_trait]
pub trait PppControl: Send + Sync {
    async fn new_session(&self, encap: PppEncap, v4: bool, v6: bool) -> Result<()>;
    async fn reset(&self) -> Result<()>;
    async fn start_tcp(&self) -> Result<()>;
}

/// PPP framing used for the whole session, analogous to `PPP_ENCAP_FORTINET`
/// passed to `openconnect_ppp_new`. Transport (TLS vs. DTLS) is a separate
/// concern handled by `TransportControl` and the DTLS side channel; this
/// enum only has one member today because the gateway speaks a single
/// framing, but it stays an enum rather than a unit struct so a future
/// encapsulation variant doesn't need every call site touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PppEncap {
    Fortinet,
}

/// TLS channel control. DTLS datagrams go through the same transport but are
/// addressed by the ESP/DTLS layer directly; this trait covers only the
/// TLS-framed tunnel socket.
#[async_trait]
pub trait TransportControl: Send + Sync {
    async fn ssl_write(&self, bytes: &[u8]) -> Result<()>;
    async fn open_https(&self) -> Result<()>;
    async fn close_https(&self) -> Result<()>;
}

/// Outcome of presenting an auth form to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthUiOutcome {
    Ok(AuthForm),
    Cancelled,
}

/// Prompts the user for credentials/challenge responses.
#[async_trait]
pub trait AuthUi: Send + Sync {
    async fn process_auth_form(
        &self,
        form: &AuthForm,
        cancel: &CancellationToken,
    ) -> Result<AuthUiOutcome>;
}

/// OTP/token generator integration.
#[async_trait]
pub trait TokenGenerator: Send + Sync {
    fn can_gen(&self, field: &str) -> bool;
    async fn gen(&self, form: &AuthForm) -> Result<String>;
}
