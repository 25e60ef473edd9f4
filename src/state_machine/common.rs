// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Outcome of a single state step.
pub enum Transition<S, R> {
    /// Move to a new state, carrying an intermediate result.
    Next(S, R),
    /// Remain in the current state (used for retry-style steps).
    Stay(R),
    /// Terminate the state machine with a final result.
    Done(R),
}

/// A single state in a state machine driven by `StateMachineCtx::execute`.
pub trait StateMachine<Ctx, RespCtx>: Sized {
    type StepResult<'a>: Future<Output = RespCtx> + Send + 'a
    where
        Self: 'a,
        RespCtx: 'a,
        Ctx: 'a;

    fn step<'a>(&'a self, ctx: &'a mut Ctx) -> Self::StepResult<'a>;
}

/// Drives a context's internal state enum to completion.
pub trait StateMachineCtx<Ctx, Out> {
    fn execute(
        &mut self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Out>> + Send;
}
