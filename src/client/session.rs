// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Per-connection session context. The core is explicitly single-session:
//! one `Session` is created at connect time and torn down at disconnect,
//! never shared across concurrent connects.

use std::time::{Duration, SystemTime};

use crate::{cfg::enums::DtlsState, models::esp::sa::SecurityAssociation, models::ip_config::IpConfig};

/// Everything the Fortinet state engine needs to carry between HTTP auth,
/// tunnel bring-up, and the ESP/PPP datapath.
#[derive(Debug)]
pub struct Session {
    pub host: String,
    pub port: u16,
    pub realm: Option<String>,

    /// Set once `remote/logincheck` succeeds; cleared on `InvalidCookie`.
    pub svpn_cookie: Option<String>,

    pub dtls: DtlsState,

    /// Cached upgrade-request bodies, immutable once first built — survive
    /// across reconnects because reconfiguration invalidates the cookie,
    /// not these buffers.
    pub ppp_tls_connect_req: Option<Vec<u8>>,
    pub ppp_dtls_connect_req: Option<Vec<u8>>,

    pub ip: IpConfig,

    pub idle_timeout: Option<Duration>,
    pub last_activity: SystemTime,
    pub auth_expiration: Option<SystemTime>,
    pub dpd_interval: Duration,

    pub esp_in: Option<SecurityAssociation>,
    pub esp_out: Option<SecurityAssociation>,
}

impl Session {
    pub fn new(host: impl Into<String>, port: u16, realm: Option<String>, dpd_interval: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            realm,
            svpn_cookie: None,
            dtls: DtlsState::NoSecret,
            ppp_tls_connect_req: None,
            ppp_dtls_connect_req: None,
            ip: IpConfig::default(),
            idle_timeout: None,
            last_activity: SystemTime::now(),
            auth_expiration: None,
            dpd_interval,
            esp_in: None,
            esp_out: None,
        }
    }

    /// Invalidates the cookie and any cached connect requests, e.g. on an
    /// `InvalidCookie` redirect to the login page. ESP state and IP
    /// configuration are left alone; a fresh login will renegotiate them
    /// before they're used again.
    pub fn invalidate_cookie(&mut self) {
        self.svpn_cookie = None;
        self.ppp_tls_connect_req = None;
        self.ppp_dtls_connect_req = None;
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    pub fn is_idle_expired(&self, now: SystemTime) -> bool {
        match self.idle_timeout {
            Some(timeout) => now.duration_since(self.last_activity).unwrap_or_default() >= timeout,
            None => false,
        }
    }

    pub fn touch_activity(&mut self, now: SystemTime) {
        self.last_activity = now;
    }

    pub fn is_auth_expired(&self, now: SystemTime) -> bool {
        match self.auth_expiration {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_secret_dtls_state() {
        let s = Session::new("vpn.example.com", 443, None, Duration::from_secs(30));
        assert_eq!(s.dtls, DtlsState::NoSecret);
        assert!(s.svpn_cookie.is_none());
    }

    #[test]
    fn invalidate_cookie_clears_cached_connect_requests() {
        let mut s = Session::new("vpn.example.com", 443, None, Duration::from_secs(30));
        s.svpn_cookie = Some("abc123".into());
        s.ppp_tls_connect_req = Some(vec![1, 2, 3]);
        s.invalidate_cookie();
        assert!(s.svpn_cookie.is_none());
        assert!(s.ppp_tls_connect_req.is_none());
    }

    #[test]
    fn base_url_formats_host_and_port() {
        let s = Session::new("vpn.example.com", 10443, None, Duration::from_secs(30));
        assert_eq!(s.base_url(), "https://vpn.example.com:10443");
    }

    #[test]
    fn auth_expiration_in_the_past_is_expired() {
        let mut s = Session::new("vpn.example.com", 443, None, Duration::from_secs(30));
        s.auth_expiration = Some(SystemTime::UNIX_EPOCH);
        assert!(s.is_auth_expired(SystemTime::now()));
    }

    #[test]
    fn idle_timeout_trips_after_duration_elapses() {
        let mut s = Session::new("vpn.example.com", 443, None, Duration::from_secs(30));
        s.idle_timeout = Some(Duration::from_secs(60));
        s.last_activity = SystemTime::UNIX_EPOCH;
        let almost = SystemTime::UNIX_EPOCH + Duration::from_secs(59);
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(61);
        assert!(!s.is_idle_expired(almost));
        assert!(s.is_idle_expired(past));
    }
}
