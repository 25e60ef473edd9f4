use fortivpn_core::{
    cfg::enums::{CipherAlg, HmacAlg},
    models::esp::{packet::IV_LEN, sa::SecurityAssociation},
};

#[test]
fn outbound_sa_enc_key_matches_cipher_key_length() {
    let cipher = CipherAlg::Aes256Cbc;
    let enc_key = vec![0x11u8; cipher.key_len()];
    let hmac_key = vec![0x22u8; 20];
    let sa = SecurityAssociation::new_outbound(
        0x1234_5678,
        cipher,
        HmacAlg::Sha1,
        enc_key,
        hmac_key,
        [0u8; IV_LEN],
    );
    assert_eq!(sa.enc_key().len(), cipher.key_len());
    assert_eq!(sa.spi, 0x1234_5678);
}

#[test]
fn inbound_sa_starts_at_sequence_zero() {
    let cipher = CipherAlg::Aes128Cbc;
    let enc_key = vec![0u8; cipher.key_len()];
    let hmac_key = vec![0u8; 16];
    let sa = SecurityAssociation::new_inbound(0xaabb_ccdd, cipher, HmacAlg::Md5, enc_key, hmac_key, 64);
    assert_eq!(sa.last_seq(), 0);
}
