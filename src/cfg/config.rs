// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::cfg::enums::{CipherAlg, HmacAlg};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Server connection parameters.
    pub server: ServerConfig,
    /// Login credentials and optional OTP source.
    pub credentials: Credentials,
    /// ESP cipher/HMAC selection (must match what the server negotiates).
    pub esp: EspConfig,
    /// Timers and other runtime knobs that live outside the wire protocol.
    pub runtime: RuntimeConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Fortinet server endpoint.
pub struct ServerConfig {
    #[serde(rename = "Host")]
    /// Hostname or IP address of the SSL VPN gateway.
    pub host: String,

    #[serde(rename = "Port", default = "default_port")]
    /// TCP/UDP port shared by TLS and DTLS.
    pub port: u16,

    #[serde(default, rename = "Realm")]
    /// Optional realm override; normally discovered from the `/` redirect.
    pub realm: String,
}

fn default_port() -> u16 {
    443
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Credentials used by the Auth Form Driver.
pub struct Credentials {
    #[serde(rename = "Username")]
    /// Value submitted in the `username` field.
    pub username: String,

    #[serde(rename = "Password")]
    /// Value submitted in the `credential` field.
    pub password: String,

    #[serde(default, rename = "HasTokenGenerator")]
    /// Whether a local tokencode generator is configured; controls whether
    /// the challenge-phase field is typed `Token` or `Password`.
    pub has_token_generator: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// ESP algorithm selection. Both sides of the tunnel must agree on these out
/// of band (key derivation is out of scope; see spec §1).
pub struct EspConfig {
    #[serde(rename = "Cipher")]
    pub cipher: CipherAlg,

    #[serde(rename = "Hmac")]
    pub hmac: HmacAlg,

    #[serde(default = "default_replay_window", rename = "ReplayWindow")]
    /// Width in packets of the inbound anti-replay sliding window. Must be
    /// >= 64 per spec §4.1.
    pub replay_window: u32,
}

fn default_replay_window() -> u32 {
    64
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Runtime-only settings that do not map to any wire field.
pub struct RuntimeConfig {
    #[serde(rename = "ConnectTimeout", with = "serde_secs")]
    /// Timeout for establishing the initial TLS connection.
    pub connect_timeout: Duration,

    #[serde(rename = "DpdFloor", with = "serde_secs")]
    /// Lower bound on the Dead Peer Detection interval; the config XML may
    /// only shrink DPD down to this floor (spec §4.2 `dtls-config`).
    pub dpd_floor: Duration,
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(!self.server.host.is_empty(), "server.host must not be empty");
        ensure!(self.server.port != 0, "server.port must be nonzero");
        ensure!(
            !self.credentials.username.is_empty(),
            "credentials.username must not be empty"
        );
        ensure!(
            self.esp.replay_window >= 64,
            "esp.replay_window must be >= 64"
        );
        if self.runtime.dpd_floor.as_secs() == 0 {
            self.runtime.dpd_floor = Duration::from_secs(10);
        }
        Ok(())
    }
}

/// Serde helpers for representing `Duration` as a number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "vpn.example.com".into(),
                port: 443,
                realm: String::new(),
            },
            credentials: Credentials {
                username: "alice".into(),
                password: "pw".into(),
                has_token_generator: false,
            },
            esp: EspConfig {
                cipher: CipherAlg::Aes128Cbc,
                hmac: HmacAlg::Sha1,
                replay_window: 64,
            },
            runtime: RuntimeConfig {
                connect_timeout: Duration::from_secs(10),
                dpd_floor: Duration::from_secs(0),
            },
        }
    }

    #[test]
    fn validate_rejects_empty_host() {
        let mut cfg = sample();
        cfg.server.host.clear();
        assert!(cfg.validate_and_normalize().is_err());
    }

    #[test]
    fn validate_rejects_small_replay_window() {
        let mut cfg = sample();
        cfg.esp.replay_window = 32;
        assert!(cfg.validate_and_normalize().is_err());
    }

    #[test]
    fn validate_normalizes_zero_dpd_floor() {
        let mut cfg = sample();
        cfg.validate_and_normalize().expect("valid config");
        assert_eq!(cfg.runtime.dpd_floor, Duration::from_secs(10));
    }
}
