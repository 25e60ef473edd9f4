// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Core Fortinet-protocol state engine and ESP datapath: HTTP auth, tunnel
//! config parsing, PPP bring-up sequencing, and the ESP crypto fast path.
//! I/O, UI, and OS integration are out of scope — this crate drives a set of
//! collaborator traits (`client::collaborators`) that a binary wires up.

/// Configuration, CLI parsing, and logging.
pub mod cfg;
/// Session context and the collaborator traits the core drives.
pub mod client;
/// `sslvpn-tunnel` config XML parser.
pub mod config_xml;
/// ESP encrypt/decrypt, HMAC, and anti-replay.
pub mod crypto;
/// Error taxonomy shared across collaborator boundaries.
pub mod error;
/// DTLS hello framing and option-list filtering.
pub mod handlers;
/// Data model: auth forms, IP configuration, ESP packets and SAs.
pub mod models;
/// Auth Form Driver, Tunnel Bringup, and Teardown state machines.
pub mod state_machine;
