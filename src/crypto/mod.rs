// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Per-packet encrypt/decrypt, HMAC, and IV chaining.
pub mod esp;
/// Inbound anti-replay sliding window.
pub mod replay;
