// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{future::Future, pin::Pin};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    state_machine::{
        auth::common::{extract_action_blob, kv_lookup, parse_kv_list, AuthCtx},
        common::{StateMachine, StateMachineCtx, Transition},
    },
};

#[derive(Debug)]
pub struct Init;
#[derive(Debug)]
pub struct Login;
#[derive(Debug)]
pub struct Challenge;

#[derive(Debug)]
pub enum AuthStates {
    Init(Init),
    Login(Login),
    Challenge(Challenge),
}

type AuthStepOut = Transition<AuthStates, Result<()>>;

impl StateMachine<AuthCtx, AuthStepOut> for Init {
    type StepResult<'a>
        = Pin<Box<dyn Future<Output = AuthStepOut> + Send + 'a>>
    where
        Self: 'a,
        AuthCtx: 'a;

    fn step<'a>(&'a self, ctx: &'a mut AuthCtx) -> Self::StepResult<'a> {
        Box::pin(async move {
            match ctx.discover_realm().await {
                Ok(()) => {
                    debug!(realm = ?ctx.realm, "auth driver discovered realm");
                    Transition::Next(AuthStates::Login(Login), Ok(()))
                },
                Err(e) => Transition::Done(Err(e)),
            }
        })
    }
}

impl StateMachine<AuthCtx, AuthStepOut> for Login {
    type StepResult<'a>
        = Pin<Box<dyn Future<Output = AuthStepOut> + Send + 'a>>
    where
        Self: 'a,
        AuthCtx: 'a;

    fn step<'a>(&'a self, ctx: &'a mut AuthCtx) -> Self::StepResult<'a> {
        Box::pin(async move {
            let cancel = ctx.cancel.clone();
            let filled = match ctx.prompt(&cancel).await {
                Ok(f) => f,
                Err(e) => return Transition::Done(Err(e)),
            };
            let (status, body) = match ctx.submit_login(&filled).await {
                Ok(r) => r,
                Err(e) => return Transition::Done(Err(e)),
            };

            if ctx.http.cookie("SVPNCOOKIE").is_some() {
                return Transition::Done(Ok(()));
            }
            if status == 200 && body.starts_with("ret=") && body.contains(",tokeninfo=") {
                let pairs = parse_kv_list(&body, ',');
                let has_token_generator = ctx.tokens.can_gen("code");
                ctx.form = filled.into_challenge_form(has_token_generator);
                if let Some(msg) = kv_lookup(&pairs, "chal_msg") {
                    ctx.form.message = Some(msg.to_string());
                }
                ctx.action = extract_action_blob(&body);
                return Transition::Next(AuthStates::Challenge(Challenge), Ok(()));
            }
            Transition::Stay(Ok(()))
        })
    }
}

impl StateMachine<AuthCtx, AuthStepOut> for Challenge {
    type StepResult<'a>
        = Pin<Box<dyn Future<Output = AuthStepOut> + Send + 'a>>
    where
        Self: 'a,
        AuthCtx: 'a;

    fn step<'a>(&'a self, ctx: &'a mut AuthCtx) -> Self::StepResult<'a> {
        Box::pin(async move {
            let cancel = ctx.cancel.clone();
            let filled = match ctx.prompt(&cancel).await {
                Ok(f) => f,
                Err(e) => return Transition::Done(Err(e)),
            };
            if let Err(e) = ctx.submit_challenge(&filled).await {
                return Transition::Done(Err(e));
            }

            if ctx.http.cookie("SVPNCOOKIE").is_some() {
                Transition::Done(Ok(()))
            } else {
                Transition::Next(AuthStates::Challenge(Challenge), Ok(()))
            }
        })
    }
}

/// Drives the login/challenge round trip to a final `SVPNCOOKIE` value.
pub struct AuthDriver {
    ctx: AuthCtx,
    state: Option<AuthStates>,
}

impl AuthDriver {
    pub fn new(ctx: AuthCtx) -> Self {
        Self { ctx, state: Some(AuthStates::Init(Init)) }
    }
}

impl StateMachineCtx<AuthCtx, String> for AuthDriver {
    async fn execute(&mut self, cancel: &CancellationToken) -> Result<String> {
        self.ctx.cancel = cancel.clone();
        loop {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            let state = self.state.take().expect("auth driver state always set between steps");
            let trans = match &state {
                AuthStates::Init(s) => s.step(&mut self.ctx).await,
                AuthStates::Login(s) => s.step(&mut self.ctx).await,
                AuthStates::Challenge(s) => s.step(&mut self.ctx).await,
            };
            match trans {
                Transition::Next(next, Ok(())) => self.state = Some(next),
                Transition::Next(_, Err(e)) => return Err(e),
                Transition::Stay(Ok(())) => {
                    self.state = Some(match state {
                        AuthStates::Init(_) => AuthStates::Init(Init),
                        AuthStates::Login(_) => AuthStates::Login(Login),
                        AuthStates::Challenge(_) => AuthStates::Challenge(Challenge),
                    });
                },
                Transition::Stay(Err(e)) => return Err(e),
                Transition::Done(Ok(())) => {
                    return self
                        .ctx
                        .http
                        .cookie("SVPNCOOKIE")
                        .ok_or_else(|| CoreError::protocol("DONE reached without SVPNCOOKIE"));
                },
                Transition::Done(Err(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_init() {
        // Constructing an AuthDriver requires live collaborators; this test
        // only pins the state enum's initial variant shape so a refactor
        // that drops INIT is caught at compile time via the match above.
        let state = AuthStates::Init(Init);
        assert!(matches!(state, AuthStates::Init(_)));
    }
}
