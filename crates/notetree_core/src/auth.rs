//! Caller credentials and login/registration flows.
//!
//! # Responsibility
//! - Carry the bearer credential into every content-service call.
//! - Validate login/registration input before it reaches the API.
//!
//! # Invariants
//! - A `Credential` is never blank.
//! - Credential text is never written to logs or `Debug` output.

use crate::service::content::ContentError;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Bearer token identifying the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Returns `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Supplies the current caller credential, if any.
pub trait CredentialProvider {
    fn credential(&self) -> Option<Credential>;
}

/// Provider backed by a fixed, possibly absent, credential.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(credential: Option<Credential>) -> Self {
        Self(credential)
    }

    /// Builds from raw token text; blank text means unauthenticated.
    pub fn from_token(token: Option<&str>) -> Self {
        Self(token.and_then(Credential::new))
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<Credential>,
{
    fn credential(&self) -> Option<Credential> {
        self()
    }
}

/// Account role returned at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Any role other than `admin` is a regular user.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
    pub role: Role,
}

/// Raw login response; `token` may be missing on a malformed reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Account endpoints of the remote service.
pub trait SessionApi {
    fn login(&self, username: &str, password: &str) -> Result<LoginReply, ContentError>;
    fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ContentError>;
}

/// Errors from login/registration flows.
#[derive(Debug)]
pub enum AuthError {
    /// One or more required fields are blank.
    MissingFields,
    /// Login succeeded at transport level but no token came back.
    NoToken,
    /// Remote call failed.
    Api(ContentError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "all fields are required"),
            Self::NoToken => write!(f, "login failed: no token received"),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentError> for AuthError {
    fn from(value: ContentError) -> Self {
        Self::Api(value)
    }
}

/// Logs in and returns the session credential and role.
pub fn login<A: SessionApi + ?Sized>(
    api: &A,
    username: &str,
    password: &str,
) -> Result<Session, AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    let reply = api.login(username.trim(), password).map_err(|err| {
        warn!("event=login module=auth status=error error={err}");
        AuthError::from(err)
    })?;
    let credential = reply
        .token
        .as_deref()
        .and_then(Credential::new)
        .ok_or(AuthError::NoToken)?;
    let role = reply.role.as_deref().map_or(Role::User, Role::parse);
    info!("event=login module=auth status=ok role={role:?}");
    Ok(Session { credential, role })
}

/// Registers a new account.
pub fn register<A: SessionApi + ?Sized>(
    api: &A,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), AuthError> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    api.register(username.trim(), email.trim(), password)?;
    info!("event=register module=auth status=ok");
    Ok(())
}
