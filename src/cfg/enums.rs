// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

/// Symmetric cipher selection for the ESP datapath.
///
/// Block size is fixed at 16 bytes for both variants; only the key length
/// (and thus the AES round count) differs.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlg {
    #[serde(rename = "aes128", alias = "AES128", alias = "aes-128-cbc")]
    Aes128Cbc,
    #[serde(rename = "aes256", alias = "AES256", alias = "aes-256-cbc")]
    Aes256Cbc,
}

impl CipherAlg {
    /// Key length in bytes for this cipher.
    pub fn key_len(self) -> usize {
        match self {
            CipherAlg::Aes128Cbc => 16,
            CipherAlg::Aes256Cbc => 32,
        }
    }
}

impl fmt::Display for CipherAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CipherAlg::Aes128Cbc => "aes128",
            CipherAlg::Aes256Cbc => "aes256",
        })
    }
}

/// HMAC selection for the ESP datapath. Both are truncated to 12 bytes on
/// the wire regardless of native digest size.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlg {
    #[serde(rename = "md5", alias = "MD5")]
    Md5,
    #[serde(rename = "sha1", alias = "SHA1")]
    Sha1,
}

impl fmt::Display for HmacAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HmacAlg::Md5 => "md5",
            HmacAlg::Sha1 => "sha1",
        })
    }
}

/// DTLS lifecycle state for the session.
///
/// `NoSecret` → `Secret` happens when the config XML enables DTLS;
/// `Secret` → `Connected` happens when the DTLS record layer establishes the
/// handshake (out of scope here, owned by the transport collaborator);
/// `Connected` → `Established` happens when the DTLS Hello Matcher accepts
/// the inband svrhello frame. Any state can be forced to `Disabled`, which is
/// terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DtlsState {
    #[default]
    NoSecret,
    Secret,
    Connected,
    Established,
    Disabled,
}

impl fmt::Display for DtlsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DtlsState::NoSecret => "NoSecret",
            DtlsState::Secret => "Secret",
            DtlsState::Connected => "Connected",
            DtlsState::Established => "Established",
            DtlsState::Disabled => "Disabled",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_key_lengths() {
        assert_eq!(CipherAlg::Aes128Cbc.key_len(), 16);
        assert_eq!(CipherAlg::Aes256Cbc.key_len(), 32);
    }

    #[test]
    fn dtls_state_default_is_no_secret() {
        assert_eq!(DtlsState::default(), DtlsState::NoSecret);
    }
}
