// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! ESP wire format: `spi(4) || seq(4) || iv(16) || ciphertext || hmac(12)`.

use bytes::BytesMut;
use zerocopy::{BigEndian, FromBytes, Immutable, IntoBytes, KnownLayout, U32};

pub const ESP_HEADER_LEN: usize = 8;
pub const IV_LEN: usize = 16;
pub const BLOCK_SIZE: usize = 16;
pub const MAX_PAD: usize = BLOCK_SIZE;
pub const HMAC_LEN: usize = 12;
pub const NEXT_HEADER_IPV4: u8 = 0x04;

const IV_OFFSET: usize = ESP_HEADER_LEN;
const DATA_OFFSET: usize = IV_OFFSET + IV_LEN;

/// Fixed 8-byte `spi || seq` header, big-endian on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct EspHeader {
    pub spi: U32<BigEndian>,
    pub seq: U32<BigEndian>,
}

/// An ESP packet buffer: header + IV inline, followed by a variable-length
/// data region (cleartext on encrypt entry, ciphertext-and-pad on encrypt
/// exit / decrypt entry), followed by a 12-byte HMAC tail once appended.
///
/// Sized lazily via `BytesMut` rather than a fixed array, since the crate
/// never pools packets across sessions.
#[derive(Debug, Clone)]
pub struct Packet {
    buf: BytesMut,
    data_len: usize,
}

impl Packet {
    /// Builds a packet from cleartext IP bytes, ready for `encrypt`. Header
    /// and IV bytes are zeroed placeholders filled in by the crypto engine.
    pub fn from_plaintext(payload: &[u8]) -> Self {
        let mut buf = BytesMut::zeroed(DATA_OFFSET + payload.len() + MAX_PAD + 2 + HMAC_LEN);
        buf.truncate(DATA_OFFSET + payload.len());
        buf[DATA_OFFSET..].copy_from_slice(payload);
        Self { buf, data_len: payload.len() }
    }

    /// Builds a packet from an on-wire ESP datagram with the HMAC still
    /// trailing (caller has already stripped nothing; `ciphertext_len` is
    /// the length of the data region between IV and HMAC).
    pub fn from_wire(bytes: &[u8], ciphertext_len: usize) -> Option<Self> {
        if bytes.len() != DATA_OFFSET + ciphertext_len + HMAC_LEN {
            return None;
        }
        Some(Self {
            buf: BytesMut::from(bytes),
            data_len: ciphertext_len,
        })
    }

    pub fn header(&self) -> &EspHeader {
        EspHeader::ref_from_bytes(&self.buf[0..ESP_HEADER_LEN])
            .expect("header region is exactly sizeof(EspHeader)")
    }

    pub fn set_header(&mut self, spi: u32, seq: u32) {
        let header = EspHeader {
            spi: U32::new(spi),
            seq: U32::new(seq),
        };
        self.buf[0..ESP_HEADER_LEN].copy_from_slice(header.as_bytes());
    }

    pub fn iv(&self) -> &[u8] {
        &self.buf[IV_OFFSET..DATA_OFFSET]
    }

    pub fn set_iv(&mut self, iv: &[u8; IV_LEN]) {
        self.buf[IV_OFFSET..DATA_OFFSET].copy_from_slice(iv);
    }

    /// The data region: plaintext before padding, ciphertext+pad after.
    pub fn data(&self) -> &[u8] {
        &self.buf[DATA_OFFSET..DATA_OFFSET + self.data_len]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf[DATA_OFFSET..DATA_OFFSET + self.data_len]
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Appends `extra` to the data region (used to append RFC 4303 padding).
    pub fn extend_data(&mut self, extra: &[u8]) {
        let at = DATA_OFFSET + self.data_len;
        self.buf.truncate(at);
        self.buf.extend_from_slice(extra);
        self.data_len += extra.len();
    }

    /// Appends a 12-byte HMAC tag after the data region.
    pub fn append_hmac(&mut self, tag: &[u8; HMAC_LEN]) {
        self.buf.truncate(DATA_OFFSET + self.data_len);
        self.buf.extend_from_slice(tag);
    }

    /// The trailing HMAC tag, if one is present (buffer longer than header
    /// + IV + data region).
    pub fn hmac_tail(&self) -> Option<&[u8]> {
        let at = DATA_OFFSET + self.data_len;
        (self.buf.len() >= at + HMAC_LEN).then(|| &self.buf[at..at + HMAC_LEN])
    }

    /// Everything the HMAC is computed over: header || iv || data region.
    pub fn hmac_input(&self) -> &[u8] {
        &self.buf[0..DATA_OFFSET + self.data_len]
    }

    pub fn wire_len(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }
}
