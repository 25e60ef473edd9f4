// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// DTLS clthello/svrhello framing.
pub mod dtls_hello;
/// Separator-delimited option list filtering.
pub mod filter_opts;
