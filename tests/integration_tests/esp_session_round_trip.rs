use fortivpn_core::{
    cfg::enums::{CipherAlg, HmacAlg},
    crypto::esp::EspEngine,
    error::CoreError,
    models::esp::{
        packet::{Packet, ESP_HEADER_LEN, HMAC_LEN, IV_LEN},
        sa::SecurityAssociation,
    },
};

fn matched_sas() -> (SecurityAssociation, SecurityAssociation) {
    let enc_key = vec![0x42u8; 16];
    let hmac_key = vec![0x24u8; 20];
    let out = SecurityAssociation::new_outbound(
        0x1000_2000,
        CipherAlg::Aes128Cbc,
        HmacAlg::Sha1,
        enc_key.clone(),
        hmac_key.clone(),
        [0u8; IV_LEN],
    );
    let inb = SecurityAssociation::new_inbound(0x1000_2000, CipherAlg::Aes128Cbc, HmacAlg::Sha1, enc_key, hmac_key, 64);
    (out, inb)
}

fn from_wire(bytes: &[u8]) -> Packet {
    let ciphertext_len = bytes.len() - ESP_HEADER_LEN - IV_LEN - HMAC_LEN;
    Packet::from_wire(bytes, ciphertext_len).expect("well-formed wire packet")
}

#[test]
fn decrypt_of_encrypt_recovers_original_payload_across_two_sas() {
    let (mut out, mut inb) = matched_sas();
    let plaintext = vec![0x41u8; 20];
    let mut pkt = Packet::from_plaintext(&plaintext);

    let wire_len = EspEngine::encrypt(&mut out, &mut pkt).expect("encrypt should succeed");
    assert_eq!(wire_len, ESP_HEADER_LEN + IV_LEN + 20 + 10 + 2 + HMAC_LEN);

    let wire = pkt.into_bytes();
    let mut rx = from_wire(&wire);
    EspEngine::decrypt(&mut inb, &mut rx).expect("decrypt should succeed");
    assert_eq!(&rx.data()[..20], plaintext.as_slice());
}

#[test]
fn second_packet_changes_chained_iv_and_still_round_trips() {
    let (mut out, mut inb) = matched_sas();

    let first_iv = *out.next_iv();
    let mut pkt1 = Packet::from_plaintext(&[0u8; 5]);
    EspEngine::encrypt(&mut out, &mut pkt1).unwrap();
    let second_iv = *out.next_iv();
    assert_ne!(first_iv, second_iv);

    let mut pkt2 = Packet::from_plaintext(&[1u8; 5]);
    EspEngine::encrypt(&mut out, &mut pkt2).unwrap();

    let wire1 = pkt1.into_bytes();
    let wire2 = pkt2.into_bytes();
    let mut rx1 = from_wire(&wire1);
    let mut rx2 = from_wire(&wire2);
    EspEngine::decrypt(&mut inb, &mut rx1).unwrap();
    EspEngine::decrypt(&mut inb, &mut rx2).unwrap();
    assert_eq!(&rx1.data()[..5], &[0u8; 5]);
    assert_eq!(&rx2.data()[..5], &[1u8; 5]);
}

#[test]
fn replayed_sequence_number_is_rejected_and_sa_state_is_unchanged() {
    let (mut out, mut inb) = matched_sas();
    let mut pkt = Packet::from_plaintext(&[7u8; 3]);
    EspEngine::encrypt(&mut out, &mut pkt).unwrap();
    let wire_bytes = pkt.into_bytes();

    let mut first = from_wire(&wire_bytes);
    EspEngine::decrypt(&mut inb, &mut first).unwrap();
    let seq_after_first = inb.last_seq();

    let mut replay = from_wire(&wire_bytes);
    let err = EspEngine::decrypt(&mut inb, &mut replay).unwrap_err();
    assert!(matches!(err, CoreError::Replay));
    assert_eq!(inb.last_seq(), seq_after_first);
}
