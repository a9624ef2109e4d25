//! Credential resolution
//!
//! Exactly one resolution path executes per run: explicit username+password,
//! username with a prompted password, or a fully prompted pair. The result
//! is reused for every connection in the run and is never persisted.

use std::fmt;

use dialoguer::{Input, Password};
use is_terminal::IsTerminal;

use crate::error::{SpDeployError, SpDeployResult};

/// Credential bound to a principal identity.
///
/// The secret never appears in `Debug` output or log lines.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Resolve a credential from the invocation.
///
/// Explicit username+password is used unmodified. A username alone triggers
/// a password prompt bound to it. With neither, both are prompted. A
/// cancelled prompt propagates as `PromptAborted`; no retry.
pub fn resolve(username: Option<String>, password: Option<String>) -> SpDeployResult<Credential> {
    match (username, password) {
        (Some(user), Some(pass)) => Ok(Credential::new(user, pass)),
        (Some(user), None) => {
            ensure_interactive()?;
            let pass = prompt_password(&user)?;
            Ok(Credential::new(user, pass))
        }
        (None, password) => {
            ensure_interactive()?;
            let user = prompt_username()?;
            let pass = match password {
                Some(pass) => pass,
                None => prompt_password(&user)?,
            };
            Ok(Credential::new(user, pass))
        }
    }
}

fn ensure_interactive() -> SpDeployResult<()> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(SpDeployError::NonInteractive)
    }
}

fn prompt_username() -> SpDeployResult<String> {
    Input::<String>::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(|_| SpDeployError::PromptAborted)
}

fn prompt_password(username: &str) -> SpDeployResult<String> {
    Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()
        .map_err(|_| SpDeployError::PromptAborted)
}
