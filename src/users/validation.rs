//! Request-shape checks for the user endpoints.
//!
//! Each function collects every violation rather than stopping at the first,
//! and hands back owned values on success. Emails come back trimmed and lowercased.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::users::dto::{LoginRequest, RegisterRequest, UpdateRequest};

const MAX_NAME: usize = 100;
const MAX_USERNAME: usize = 100;
const MAX_PASSWORD: usize = 100;
const MAX_EMAIL: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidRegister {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: String) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Checks an optional field; a present value must be non-blank and within `max` chars.
    fn optional(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        let value = value?;
        if value.trim().is_empty() {
            self.fail(field, "is not allowed to be empty".into());
            return None;
        }
        if value.chars().count() > max {
            self.fail(field, format!("length must be less than or equal to {max} characters"));
            return None;
        }
        Some(value.to_owned())
    }

    fn required(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        if value.is_none() {
            self.fail(field, "is required".into());
            return None;
        }
        self.optional(field, value, max)
    }

    fn email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = value?.trim().to_lowercase();
        if !is_valid_email(&value) {
            self.fail(field, "must be a valid email".into());
            return None;
        }
        Some(value)
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

pub fn validate_register(req: &RegisterRequest) -> Result<ValidRegister, Vec<FieldError>> {
    let mut c = Checker::default();
    let name = c.required("name", req.name.as_deref(), MAX_NAME);
    let username = c.required("username", req.username.as_deref(), MAX_USERNAME);
    let email = c.required("email", req.email.as_deref(), MAX_EMAIL);
    let email = c.email("email", email);
    let password = c.required("password", req.password.as_deref(), MAX_PASSWORD);
    c.finish(|| ValidRegister {
        name: name.unwrap_or_default(),
        username: username.unwrap_or_default(),
        email: email.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

pub fn validate_login(req: &LoginRequest) -> Result<ValidLogin, Vec<FieldError>> {
    let mut c = Checker::default();
    let email = c
        .required("email", req.email.as_deref(), MAX_EMAIL)
        .map(|e| e.trim().to_lowercase());
    let password = c.required("password", req.password.as_deref(), MAX_PASSWORD);
    c.finish(|| ValidLogin {
        email: email.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

pub fn validate_update(req: &UpdateRequest) -> Result<ValidUpdate, Vec<FieldError>> {
    let mut c = Checker::default();
    let name = c.optional("name", req.name.as_deref(), MAX_NAME);
    let username = c.optional("username", req.username.as_deref(), MAX_USERNAME);
    let email = c.optional("email", req.email.as_deref(), MAX_EMAIL);
    let email = c.email("email", email);
    let password = c.optional("password", req.password.as_deref(), MAX_PASSWORD);
    c.finish(|| ValidUpdate {
        name,
        username,
        email,
        password,
    })
}
