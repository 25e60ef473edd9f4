// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Auth Form Driver: drives the login/challenge round trip to a session cookie.
pub mod auth;
/// Tunnel Bringup sequence: config fetch through PPP main-loop start.
pub mod bringup;
/// `Transition`/`StateMachine`/`StateMachineCtx` plumbing shared by the
/// state machines above.
pub mod common;
/// Best-effort session teardown.
pub mod teardown;
