// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::{form_urlencoded, Url};

use crate::{
    client::collaborators::{AuthUi, AuthUiOutcome, HttpClient, HttpMethod, TokenGenerator},
    error::{CoreError, Result},
    handlers::filter_opts::filter_opts,
    models::auth_form::AuthForm,
};

/// Keys carried verbatim through the challenge round-trip. No semantic
/// interpretation is attempted.
pub const CHALLENGE_ACTION_KEYS: &[&str] = &["reqid", "polid", "grp", "portal", "peer", "magic"];

/// Extracts the opaque carry-over blob from a CHALLENGE response body.
pub(super) fn extract_action_blob(body: &str) -> String {
    filter_opts(body, ',', CHALLENGE_ACTION_KEYS, true)
}

pub(super) fn parse_kv_list(body: &str, sep: char) -> Vec<(String, String)> {
    body.split(sep)
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, '=');
            let key = parts.next()?.trim();
            if key.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").to_string();
            Some((key.to_string(), value))
        })
        .collect()
}

pub(super) fn kv_lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

pub(super) fn extract_realm_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "realm")
        .map(|(_, v)| v.into_owned())
}

/// Shared state carried by the auth driver across INIT/LOGIN/CHALLENGE/DONE.
pub struct AuthCtx {
    pub http: Arc<dyn HttpClient>,
    pub ui: Arc<dyn AuthUi>,
    pub tokens: Arc<dyn TokenGenerator>,
    pub realm: Option<String>,
    pub form: AuthForm,
    pub action: String,
    /// Set by `AuthDriver::execute` at the start of each run; steps that
    /// prompt the UI collaborator read it from here since `StateMachine::step`
    /// only takes the context, not a side channel.
    pub(super) cancel: CancellationToken,
}

impl AuthCtx {
    pub fn new(http: Arc<dyn HttpClient>, ui: Arc<dyn AuthUi>, tokens: Arc<dyn TokenGenerator>) -> Self {
        Self {
            http,
            ui,
            tokens,
            realm: None,
            form: AuthForm::login_form(),
            action: String::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub(super) async fn discover_realm(&mut self) -> Result<()> {
        let (_status, _body) = self.http.request(HttpMethod::Get, "/", None, None).await?;
        if let Some(url) = self.http.last_url() {
            self.realm = extract_realm_from_url(&url);
        }
        Ok(())
    }

    fn encode_form(pairs: &[(&str, &str)]) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    pub(super) async fn prompt(&self, cancel: &CancellationToken) -> Result<AuthForm> {
        match self.ui.process_auth_form(&self.form, cancel).await? {
            AuthUiOutcome::Ok(filled) => Ok(filled),
            AuthUiOutcome::Cancelled => Err(CoreError::Cancelled),
        }
    }

    pub(super) async fn submit_login(&mut self, filled: &AuthForm) -> Result<(u16, String)> {
        let username = filled.field_value("username").unwrap_or_default();
        let credential = filled.field_value("credential").unwrap_or_default();
        let realm = self.realm.clone().unwrap_or_default();
        let body = Self::encode_form(&[
            ("username", username),
            ("credential", credential),
            ("realm", &realm),
            ("ajax", "1"),
            ("just_logged_in", "1"),
        ]);
        let (status, bytes) = self
            .http
            .request(
                HttpMethod::Post,
                "remote/logincheck",
                Some("application/x-www-form-urlencoded"),
                Some(body.into_bytes()),
            )
            .await?;
        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub(super) async fn submit_challenge(&mut self, filled: &AuthForm) -> Result<(u16, String)> {
        let username = filled.field_value("username").unwrap_or_default();
        let code = filled.field_value("code").unwrap_or_default();
        let realm = self.realm.clone().unwrap_or_default();
        let body = format!(
            "{}&{}",
            Self::encode_form(&[("username", username), ("code", code), ("realm", &realm), ("code2", "")]),
            self.action
        );
        let (status, bytes) = self
            .http
            .request(
                HttpMethod::Post,
                "remote/logincheck",
                Some("application/x-www-form-urlencoded"),
                Some(body.into_bytes()),
            )
            .await?;
        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kv_list_splits_on_separator() {
        let pairs = parse_kv_list("ret=1,tokeninfo=x,reqid=R1", ',');
        assert_eq!(kv_lookup(&pairs, "ret"), Some("1"));
        assert_eq!(kv_lookup(&pairs, "reqid"), Some("R1"));
    }

    #[test]
    fn extract_realm_reads_query_parameter() {
        let url = "https://vpn.example.com/remote/login?realm=corp";
        assert_eq!(extract_realm_from_url(url), Some("corp".to_string()));
    }

    #[test]
    fn extract_realm_absent_is_none() {
        let url = "https://vpn.example.com/remote/login";
        assert_eq!(extract_realm_from_url(url), None);
    }

    #[test]
    fn encode_form_percent_encodes_reserved_bytes() {
        assert_eq!(AuthCtx::encode_form(&[("q", "a b&c")]), "q=a+b%26c");
    }
}
