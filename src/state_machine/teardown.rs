// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Session teardown: best effort, log and move on even if the final
//! request fails.

use tracing::warn;

use crate::client::collaborators::{HttpClient, HttpMethod, TransportControl};

/// Closes HTTPS, then issues `GET remote/logout` on a fresh connection.
/// Logout failure is logged, never propagated — the caller has already
/// decided to disconnect.
pub async fn teardown(transport: &dyn TransportControl, http: &dyn HttpClient) {
    if let Err(e) = transport.close_https().await {
        warn!("error closing https during teardown: {e}");
    }

    match http.request(HttpMethod::Get, "remote/logout", None, None).await {
        Ok((status, _)) if status == 200 => {},
        Ok((status, _)) => warn!("logout returned unexpected status {status}"),
        Err(e) => warn!("logout request failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{CoreError, Result};

    struct FailingHttp;

    #[async_trait]
    impl HttpClient for FailingHttp {
        async fn request(
            &self,
            _method: HttpMethod,
            _path: &str,
            _content_type: Option<&str>,
            _body: Option<Vec<u8>>,
        ) -> Result<(u16, Vec<u8>)> {
            Err(CoreError::transport("connection reset"))
        }
        fn cookie(&self, _name: &str) -> Option<String> {
            None
        }
        fn last_url(&self) -> Option<String> {
            None
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl TransportControl for FailingTransport {
        async fn ssl_write(&self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn open_https(&self) -> Result<()> {
            Ok(())
        }
        async fn close_https(&self) -> Result<()> {
            Err(CoreError::transport("already closed"))
        }
    }

    #[tokio::test]
    async fn teardown_never_panics_on_transport_or_http_failure() {
        teardown(&FailingTransport, &FailingHttp).await;
    }
}
