use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fortivpn_core::{
    client::collaborators::{AuthUi, AuthUiOutcome, HttpClient, HttpMethod, TokenGenerator},
    error::Result,
    models::auth_form::AuthForm,
    state_machine::auth::{AuthCtx, AuthDriver, StateMachineCtx},
};
use tokio_util::sync::CancellationToken;

/// Fake gateway: first POST returns a challenge body, second POST sets the
/// cookie.
struct FakeGateway {
    cookie: Mutex<Option<String>>,
    login_attempts: Mutex<u32>,
}

#[async_trait]
impl HttpClient for FakeGateway {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        _content_type: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<(u16, Vec<u8>)> {
        match (method, path) {
            (HttpMethod::Get, "/") => Ok((200, Vec::new())),
            (HttpMethod::Post, "remote/logincheck") => {
                let body = String::from_utf8(body.unwrap_or_default()).unwrap();
                let mut attempts = self.login_attempts.lock().unwrap();
                *attempts += 1;
                if body.contains("code=123456") {
                    *self.cookie.lock().unwrap() = Some("abc123".to_string());
                    Ok((200, Vec::new()))
                } else {
                    let resp = "ret=1,tokeninfo=x,reqid=R1,polid=P1,grp=G,portal=Q,peer=E,magic=M,chal_msg=Enter OTP";
                    Ok((200, resp.as_bytes().to_vec()))
                }
            },
            _ => Ok((404, Vec::new())),
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        if name == "SVPNCOOKIE" {
            self.cookie.lock().unwrap().clone()
        } else {
            None
        }
    }

    fn last_url(&self) -> Option<String> {
        Some("https://vpn.example.com/remote/login".to_string())
    }
}

struct ScriptedUi;

#[async_trait]
impl AuthUi for ScriptedUi {
    async fn process_auth_form(&self, form: &AuthForm, _cancel: &CancellationToken) -> Result<AuthUiOutcome> {
        let mut filled = form.clone();
        if filled.field_value("username").is_some() {
            filled.set_field_value("username", "alice");
            filled.set_field_value("credential", "pw");
        } else {
            filled.set_field_value("code", "123456");
        }
        Ok(AuthUiOutcome::Ok(filled))
    }
}

struct NoTokens;

#[async_trait]
impl TokenGenerator for NoTokens {
    fn can_gen(&self, _field: &str) -> bool {
        false
    }
    async fn gen(&self, _form: &AuthForm) -> Result<String> {
        unreachable!("no token field should be generated in this scenario")
    }
}

#[tokio::test]
async fn challenge_flow_ends_with_cookie_after_two_posts() {
    let gateway = Arc::new(FakeGateway { cookie: Mutex::new(None), login_attempts: Mutex::new(0) });
    let ctx = AuthCtx::new(gateway.clone(), Arc::new(ScriptedUi), Arc::new(NoTokens));
    let mut driver = AuthDriver::new(ctx);

    let cookie = driver
        .execute(&CancellationToken::new())
        .await
        .expect("auth driver should reach DONE");

    assert_eq!(cookie, "abc123");
    assert_eq!(*gateway.login_attempts.lock().unwrap(), 2);
}
