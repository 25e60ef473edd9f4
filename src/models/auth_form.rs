// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The auth form model driven by the Auth Form Driver.

/// Field type tag, mirrored on the rendering side by the out-of-scope UI
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Password,
    Hidden,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldType,
    pub value: String,
}

impl FormField {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldType,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value: String::new(),
        }
    }
}

/// Ordered list of labeled fields plus driver bookkeeping.
///
/// `action` is the opaque carry-over blob preserved verbatim from the
/// challenge response — the driver never interprets it, only filters and
/// re-emits it.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub fields: Vec<FormField>,
    pub auth_id: String,
    pub message: Option<String>,
    pub action: Option<String>,
}

impl AuthForm {
    /// The static two-field login form. The HTML-rendered legacy form is
    /// explicitly out of scope.
    pub fn login_form() -> Self {
        Self {
            fields: vec![
                FormField::new("username", "Username: ", FieldType::Text),
                FormField::new("credential", "Password: ", FieldType::Password),
            ],
            auth_id: String::new(),
            message: None,
            action: None,
        }
    }

    /// Reconfigures the form for the challenge phase: marks `username`
    /// `Hidden` (kept, with its already-filled value, for resubmission),
    /// renames `credential` to `code`, and types it `Token` or `Password`
    /// depending on whether a local tokencode generator is available.
    pub fn into_challenge_form(mut self, has_token_generator: bool) -> Self {
        for f in &mut self.fields {
            if f.name == "username" {
                f.kind = FieldType::Hidden;
            }
            if f.name == "credential" {
                f.name = "code".to_string();
                f.label = "Code: ".to_string();
                f.kind = if has_token_generator {
                    FieldType::Token
                } else {
                    FieldType::Password
                };
            }
        }
        self.auth_id = "_challenge".to_string();
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn set_field_value(&mut self, name: &str, value: impl Into<String>) {
        if let Some(f) = self.fields.iter_mut().find(|f| f.name == name) {
            f.value = value.into();
        }
    }
}
