// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Lenient parser for the `sslvpn-tunnel` tunnel-config XML document,
//! ported from `parse_fortinet_xml_config` in `fortinet.c`.

use std::{
    net::{Ipv4Addr, Ipv6Addr},
    time::{Duration, SystemTime},
};

use quick_xml::{Reader, events::Event};

use crate::{
    cfg::enums::DtlsState,
    error::CoreError,
    models::ip_config::{IpConfig, SplitRoute},
};

/// Everything the tunnel bringup driver needs out of the config XML, beyond
/// the IP configuration itself.
#[derive(Debug, Clone)]
pub struct ParsedTunnelConfig {
    pub ip: IpConfig,
    pub dtls_enabled: bool,
    pub auth_expiration: Option<SystemTime>,
    pub idle_timeout: Option<Duration>,
    pub dpd: Option<Duration>,
}

/// Parses `xml`. `dtls_state`/`current_dpd` feed the two rules that depend
/// on prior session state (dtls only arms from `NoSecret`; heartbeat only
/// shrinks DPD); `now` anchors the `auth-timeout` absolute deadline.
pub fn parse_tunnel_config(
    xml: &[u8],
    dtls_state: DtlsState,
    current_dpd: Duration,
    now: SystemTime,
) -> Result<ParsedTunnelConfig, CoreError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;

    let mut ip = IpConfig {
        default_route: true,
        ..IpConfig::default()
    };
    let mut dtls_enabled = false;
    let mut auth_expiration = None;
    let mut idle_timeout = None;
    let mut dpd = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CoreError::invalid_config(format!("XML parse error: {e}")))?;
        let is_start = matches!(event, Event::Start(_));
        match event {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).to_string();
                let attrs: Vec<(String, String)> = tag
                    .attributes()
                    .flatten()
                    .filter_map(|a| {
                        let key = String::from_utf8_lossy(a.key.as_ref()).to_string();
                        let val = a.unescape_value().ok()?.to_string();
                        Some((key, val))
                    })
                    .collect();

                if name == "sslvpn-tunnel" {
                    saw_root = true;
                    if let Some(v) = attr(&attrs, "dtls")
                        && v == "1"
                        && dtls_state == DtlsState::NoSecret
                    {
                        dtls_enabled = true;
                    }
                } else if name == "auth-timeout" {
                    if let Some(secs) = attr(&attrs, "val").and_then(|v| v.parse::<u64>().ok()) {
                        auth_expiration = Some(now + Duration::from_secs(secs));
                    }
                } else if name == "idle-timeout" {
                    if let Some(secs) = attr(&attrs, "val").and_then(|v| v.parse::<u64>().ok()) {
                        idle_timeout = Some(Duration::from_secs(secs));
                    }
                } else if name == "dtls-config" {
                    if let Some(secs) =
                        attr(&attrs, "heartbeat-interval").and_then(|v| v.parse::<u64>().ok())
                    {
                        let hb = Duration::from_secs(secs);
                        if secs != 0 && hb < current_dpd {
                            dpd = Some(hb);
                        }
                    }
                } else if name == "fos" {
                    tracing::info!(
                        platform = attr(&attrs, "platform").unwrap_or_default(),
                        major = attr(&attrs, "major").unwrap_or_default(),
                        minor = attr(&attrs, "minor").unwrap_or_default(),
                        patch = attr(&attrs, "patch").unwrap_or_default(),
                        build = attr(&attrs, "build").unwrap_or_default(),
                        branch = attr(&attrs, "branch").unwrap_or_default(),
                        "reported platform"
                    );
                } else if name == "assigned-addr" && stack.last().map(String::as_str) == Some("ipv4") {
                    if let Some(v) = attr(&attrs, "ipv4").and_then(|v| v.parse::<Ipv4Addr>().ok()) {
                        ip.ipv4_addr = Some(v);
                    }
                } else if name == "dns" && stack.last().map(String::as_str) == Some("ipv4") {
                    if let Some(v) = attr(&attrs, "domain") {
                        if !ip.search_domains.is_empty() {
                            ip.search_domains.push(' ');
                        }
                        ip.search_domains.push_str(&v);
                    }
                    if let Some(v) = attr(&attrs, "ip") {
                        ip.dns.push(v);
                    }
                } else if name == "addr" && stack.last().map(String::as_str) == Some("split-tunnel-info") {
                    let parent_family = stack
                        .iter()
                        .rev()
                        .find(|s| s.as_str() == "ipv4" || s.as_str() == "ipv6")
                        .map(String::as_str);
                    if parent_family == Some("ipv4")
                        && let (Some(a), Some(m)) = (
                            attr(&attrs, "ip").and_then(|v| v.parse::<Ipv4Addr>().ok()),
                            attr(&attrs, "mask").and_then(|v| v.parse::<Ipv4Addr>().ok()),
                        )
                    {
                        ip.split_includes.push(SplitRoute::V4 { addr: a, mask: m });
                        ip.default_route = false;
                    } else if parent_family == Some("ipv6")
                        && let (Some(a), Some(p)) = (
                            attr(&attrs, "ipv6").and_then(|v| v.parse::<Ipv6Addr>().ok()),
                            attr(&attrs, "prefix-len").and_then(|v| v.parse::<u8>().ok()),
                        )
                    {
                        ip.split_includes.push(SplitRoute::V6 {
                            addr: a,
                            prefix_len: p,
                        });
                        ip.default_route = false;
                    }
                } else if name == "split-dns" && stack.last().map(String::as_str) == Some("ipv4") {
                    tracing::warn!("ipv4/split-dns is present but not implemented");
                } else if name == "assigned-addr" && stack.last().map(String::as_str) == Some("ipv6") {
                    if let Some(v) = attr(&attrs, "ipv6").and_then(|v| v.parse::<Ipv6Addr>().ok()) {
                        ip.ipv6_addr = Some(v);
                    }
                    if let Some(v) = attr(&attrs, "prefix-len").and_then(|v| v.parse::<u8>().ok()) {
                        ip.ipv6_prefix_len = Some(v);
                    }
                } else if name == "dns" && stack.last().map(String::as_str) == Some("ipv6") {
                    if let Some(v) = attr(&attrs, "domain") {
                        if !ip.search_domains.is_empty() {
                            ip.search_domains.push(' ');
                        }
                        ip.search_domains.push_str(&v);
                    }
                    if let Some(v) = attr(&attrs, "ipv6") {
                        ip.dns.push(v);
                    }
                }

                if is_start {
                    stack.push(name);
                }
            },
            Event::End(_) => {
                stack.pop();
            },
            _ => {},
        }
    }

    if !saw_root {
        return Err(CoreError::invalid_config("missing sslvpn-tunnel root element"));
    }

    // Post-pass: default route only if still set and an IPv4 address was
    // assigned.
    ip.default_route = ip.default_route && ip.ipv4_addr.is_some();
    if ip.default_route {
        ip.ipv4_netmask = Some(Ipv4Addr::new(0, 0, 0, 0));
    }
    ip.search_domains = ip.search_domains.trim_end().to_string();

    Ok(ParsedTunnelConfig {
        ip,
        dtls_enabled,
        auth_expiration,
        idle_timeout,
        dpd,
    })
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}
