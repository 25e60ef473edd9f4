// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Tunnel bring-up, ported from `fortinet.c`'s `fortinet_connect`/
//! `fortinet_dtls_connect`, sequenced single-pass with no internal retries.

use tracing::{debug, warn};

use crate::{
    client::{
        collaborators::{HttpClient, HttpMethod, PppControl, PppEncap, TransportControl},
        session::Session,
    },
    config_xml::parser::parse_tunnel_config,
    error::{CoreError, Result},
    handlers::dtls_hello::build_clthello,
};

const TLS_CONNECT_REQUEST_TEMPLATE: &str =
    "GET /remote/sslvpn-tunnel HTTP/1.1\r\nHost: {host}\r\nUser-Agent: Mozilla/5.0 SV1\r\nCookie: SVPNCOOKIE={cookie}\r\n\r\n";

fn build_tls_connect_request(host: &str, cookie: &str) -> Vec<u8> {
    TLS_CONNECT_REQUEST_TEMPLATE
        .replace("{host}", host)
        .replace("{cookie}", cookie)
        .into_bytes()
}

/// Runs the full bring-up sequence: fetch and parse the tunnel config,
/// cache the TLS/DTLS connect requests, start PPP, and open the HTTPS
/// tunnel upgrade. Requires `session.svpn_cookie` to already be populated
/// by the Auth Form Driver.
pub async fn bring_up_tunnel(
    session: &mut Session,
    http: &dyn HttpClient,
    ppp: &dyn PppControl,
    transport: &dyn TransportControl,
) -> Result<()> {
    let cookie = session
        .svpn_cookie
        .clone()
        .ok_or_else(|| CoreError::protocol("tunnel bring-up started without a cookie"))?;

    // Step 1: fetch and parse the tunnel config.
    let (status, body) = http
        .request(HttpMethod::Get, "remote/fortisslvpn_xml", None, None)
        .await?;
    if status != 200 {
        session.invalidate_cookie();
        return Err(CoreError::InvalidCookie);
    }
    let parsed = parse_tunnel_config(&body, session.dtls, session.dpd_interval, std::time::SystemTime::now())?;
    session.ip = parsed.ip;
    session.dtls = if parsed.dtls_enabled {
        crate::cfg::enums::DtlsState::Secret
    } else {
        crate::cfg::enums::DtlsState::Disabled
    };
    session.auth_expiration = parsed.auth_expiration;
    session.idle_timeout = parsed.idle_timeout;
    if let Some(dpd) = parsed.dpd {
        session.dpd_interval = dpd;
    }

    // Step 2: cache the TLS connect request.
    let tls_req = build_tls_connect_request(&session.host, &cookie);
    session.ppp_tls_connect_req = Some(tls_req.clone());

    // Step 3: cache the DTLS clthello datagram.
    session.ppp_dtls_connect_req = Some(build_clthello(&cookie));

    // Step 4: initialize PPP with the encapsulation and address families the
    // parsed config calls for.
    let has_v4 = session.ip.ipv4_addr.is_some();
    let has_v6 = session.ip.ipv6_addr.is_some();
    ppp.new_session(PppEncap::Fortinet, has_v4, has_v6).await?;

    // Step 5: open HTTPS and write the cached connect request. No response
    // is expected on success; the PPP main loop sniffs for an `HTTP/` prefix
    // to detect failure.
    transport.open_https().await?;
    transport.ssl_write(&tls_req).await?;

    // Step 6: start the PPP TCP main loop.
    ppp.start_tcp().await?;

    // Step 7: read-and-except registration on the TLS socket is owned by the
    // OS-adapter collaborator; nothing to do on the core side.
    debug!("tunnel bring-up complete");
    Ok(())
}

/// Reconnect policy: reuse the cached TLS/DTLS connect requests rather than
/// rerunning the full sequence, since reconfiguring invalidates the cookie
/// on some servers.
pub async fn reconnect(
    session: &Session,
    ppp: &dyn PppControl,
    transport: &dyn TransportControl,
) -> Result<()> {
    let tls_req = session
        .ppp_tls_connect_req
        .as_ref()
        .ok_or_else(|| CoreError::protocol("reconnect attempted before first bring-up"))?;

    ppp.reset().await?;
    transport.open_https().await?;
    if let Err(e) = transport.ssl_write(tls_req).await {
        warn!("reconnect write failed: {e}");
        return Err(e);
    }
    ppp.start_tcp().await
}

/// `starts_with("HTTP/")` sniffing predicate the PPP main loop uses to
/// distinguish a login error from the start of a PPP frame.
pub fn looks_like_http_response(first_bytes: &[u8]) -> bool {
    first_bytes.starts_with(b"HTTP/")
}
