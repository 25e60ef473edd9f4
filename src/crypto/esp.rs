// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! ESP crypto engine, ported step-for-step from the upstream `esp_send`/
//! `esp_receive` pair in `gnutls-esp.c`, using RustCrypto's `aes`/`cbc`/
//! `hmac` primitives in place of GnuTLS's cipher handles.

use aes::{Aes128, Aes256};
use cbc::{Decryptor, Encryptor};
use cipher::{
    BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit,
    block_padding::NoPadding, generic_array::GenericArray,
};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

use crate::{
    cfg::enums::{CipherAlg, HmacAlg},
    error::CoreError,
    models::esp::{
        packet::{HMAC_LEN, IV_LEN, NEXT_HEADER_IPV4, Packet},
        sa::SecurityAssociation,
    },
};

const BLOCK_SIZE: usize = 16;

/// `padlen = blocksize - 1 - ((payload_len + 1) mod blocksize)`, exactly the
/// `gnutls-esp.c` formula.
fn padlen_for(payload_len: usize) -> usize {
    BLOCK_SIZE - 1 - ((payload_len + 1) % BLOCK_SIZE)
}

/// Stateless namespace for the two ESP packet operations. Cipher/HMAC state
/// lives on the `SecurityAssociation`; this type never stores keys itself.
pub struct EspEngine;

impl EspEngine {
    /// Encrypts `pkt` in place against `sa` (must be an outbound SA) and
    /// returns the total on-wire length.
    pub fn encrypt(sa: &mut SecurityAssociation, pkt: &mut Packet) -> Result<usize, CoreError> {
        let seq = sa
            .next_outbound_seq()
            .ok_or_else(|| CoreError::crypto("outbound ESP sequence exhausted, rekey required"))?;
        pkt.set_header(sa.spi, seq);

        let payload_len = pkt.data_len();
        let padlen = padlen_for(payload_len);
        let mut trailer = Vec::with_capacity(padlen + 2);
        trailer.extend(1..=padlen as u8);
        trailer.push(padlen as u8);
        trailer.push(NEXT_HEADER_IPV4);
        pkt.extend_data(&trailer);
        debug_assert_eq!(pkt.data_len() % BLOCK_SIZE, 0);

        let iv = *sa.next_iv();
        pkt.set_iv(&iv);

        cbc_encrypt_in_place(sa.cipher, sa.enc_key(), &iv, pkt.data_mut())
            .map_err(CoreError::crypto)?;

        let tag = compute_hmac(sa.hmac, sa.hmac_key(), pkt.hmac_input());
        pkt.append_hmac(&tag);

        let last_block_start = pkt.data_len() - BLOCK_SIZE;
        let mut next_iv = [0u8; IV_LEN];
        next_iv.copy_from_slice(&pkt.data()[last_block_start..]);
        encrypt_block_raw(sa.cipher, sa.enc_key(), &mut next_iv);
        sa.set_next_iv(next_iv);

        Ok(pkt.wire_len())
    }

    /// Verifies and decrypts `pkt` in place against `sa` (must be an inbound
    /// SA). `pkt.data()` on entry is the ciphertext payload, HMAC still
    /// trailing.
    pub fn decrypt(sa: &mut SecurityAssociation, pkt: &mut Packet) -> Result<(), CoreError> {
        let tag = pkt
            .hmac_tail()
            .ok_or_else(|| CoreError::protocol("ESP packet missing HMAC tail"))?;
        let tag: [u8; HMAC_LEN] = tag.try_into().map_err(|_| CoreError::protocol("short HMAC"))?;
        verify_hmac(sa.hmac, sa.hmac_key(), pkt.hmac_input(), &tag)
            .map_err(|_| CoreError::crypto("HMAC verification failed"))?;

        let seq = pkt.header().seq.get();
        if !sa.accept_inbound_seq(seq) {
            return Err(CoreError::Replay);
        }

        let iv: [u8; IV_LEN] = pkt
            .iv()
            .try_into()
            .map_err(|_| CoreError::protocol("short IV"))?;
        cbc_decrypt_in_place(sa.cipher, sa.enc_key(), &iv, pkt.data_mut())
            .map_err(CoreError::crypto)?;

        Ok(())
    }
}

/// Encrypts `buf` in place. `buf.len()` must already be a multiple of the
/// block size (the ESP padding pass guarantees this); `NoPadding` is used
/// because RFC 4303 padding was already applied by the caller.
fn cbc_encrypt_in_place(
    cipher: CipherAlg,
    key: &[u8],
    iv: &[u8; IV_LEN],
    buf: &mut [u8],
) -> Result<(), String> {
    let msg_len = buf.len();
    let result = match cipher {
        CipherAlg::Aes128Cbc => {
            Encryptor::<Aes128>::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
                .encrypt_padded_mut::<NoPadding>(buf, msg_len)
        },
        CipherAlg::Aes256Cbc => {
            Encryptor::<Aes256>::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
                .encrypt_padded_mut::<NoPadding>(buf, msg_len)
        },
    };
    result.map(|_| ()).map_err(|e| e.to_string())
}

fn cbc_decrypt_in_place(
    cipher: CipherAlg,
    key: &[u8],
    iv: &[u8; IV_LEN],
    buf: &mut [u8],
) -> Result<(), String> {
    let result = match cipher {
        CipherAlg::Aes128Cbc => {
            Decryptor::<Aes128>::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
                .decrypt_padded_mut::<NoPadding>(buf)
        },
        CipherAlg::Aes256Cbc => {
            Decryptor::<Aes256>::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
                .decrypt_padded_mut::<NoPadding>(buf)
        },
    };
    result.map(|_| ()).map_err(|e| e.to_string())
}

/// Encrypts a single 16-byte block in ECB fashion — used only to derive the
/// next chained IV, never for bulk data.
fn encrypt_block_raw(cipher: CipherAlg, key: &[u8], block: &mut [u8; IV_LEN]) {
    let mut ga = GenericArray::clone_from_slice(block);
    match cipher {
        CipherAlg::Aes128Cbc => Aes128::new(GenericArray::from_slice(key)).encrypt_block(&mut ga),
        CipherAlg::Aes256Cbc => Aes256::new(GenericArray::from_slice(key)).encrypt_block(&mut ga),
    }
    block.copy_from_slice(&ga);
}

fn compute_hmac(alg: HmacAlg, key: &[u8], data: &[u8]) -> [u8; HMAC_LEN] {
    let full = match alg {
        HmacAlg::Md5 => {
            let mut mac = <Hmac<Md5> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
            Mac::update(&mut mac, data);
            Mac::finalize(mac).into_bytes().to_vec()
        },
        HmacAlg::Sha1 => {
            let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
            Mac::update(&mut mac, data);
            Mac::finalize(mac).into_bytes().to_vec()
        },
    };
    let mut out = [0u8; HMAC_LEN];
    out.copy_from_slice(&full[..HMAC_LEN]);
    out
}

fn verify_hmac(
    alg: HmacAlg,
    key: &[u8],
    data: &[u8],
    tag: &[u8; HMAC_LEN],
) -> Result<(), hmac::digest::MacError> {
    match alg {
        HmacAlg::Md5 => {
            let mut mac = <Hmac<Md5> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
            Mac::update(&mut mac, data);
            mac.verify_truncated_left(tag)
        },
        HmacAlg::Sha1 => {
            let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
            Mac::update(&mut mac, data);
            mac.verify_truncated_left(tag)
        },
    }
}
