//! Accounts and sessions.
//!
//! [`AuthContext`] is owned by whoever drives the program (the TUI `App` or a
//! CLI command) and handed to anything that needs the signed-in user.

use std::path::{Path, PathBuf};

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::db::Database;
use crate::models::{Session, User};
use crate::ui::forms::{validate_credentials, FormError};

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error("An account with that email already exists")]
    EmailTaken,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthState {
    /// Nothing restored yet.
    Loading,
    Authenticated(Session),
    Unauthenticated,
    SignedOut,
}

pub(crate) struct AuthContext {
    state: AuthState,
    token_path: PathBuf,
}

impl AuthContext {
    pub(crate) fn new(token_path: impl Into<PathBuf>) -> Self {
        Self {
            state: AuthState::Loading,
            token_path: token_path.into(),
        }
    }

    pub(crate) fn state(&self) -> &AuthState {
        &self.state
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.state == AuthState::Loading
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub(crate) fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// Restore the persisted session, if any.
    pub(crate) fn load(&mut self, db: &Database) -> Result<&AuthState, AuthError> {
        self.state = AuthState::Loading;
        let token = read_token(&self.token_path);
        let restored = match token {
            Some(token) => db.find_session_user(&token)?.map(|user| Session { token, user }),
            None => None,
        };

        self.state = match restored {
            Some(session) => {
                tracing::debug!(user = %session.user.email, "Restored session");
                AuthState::Authenticated(session)
            }
            None => AuthState::Unauthenticated,
        };
        Ok(&self.state)
    }

    pub(crate) fn sign_up(
        &mut self,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        validate_credentials(email, password)?;
        if db.find_user_by_email(email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = User::new(email, hash_password(password)?);
        db.insert_user(&user)?;
        tracing::info!(user = %user.email, "Created account");
        self.start_session(db, user)
    }

    pub(crate) fn sign_in(
        &mut self,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let user = db
            .find_user_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(&user.password_hash, password)?;
        tracing::info!(user = %user.email, "Signed in");
        self.start_session(db, user)
    }

    pub(crate) fn sign_out(&mut self, db: &Database) -> Result<(), AuthError> {
        if let Some(session) = self.session() {
            db.delete_session(&session.token)?;
            tracing::info!(user = %session.user.email, "Signed out");
        }
        remove_token(&self.token_path)?;
        self.state = AuthState::SignedOut;
        Ok(())
    }

    fn start_session(&mut self, db: &Database, user: User) -> Result<&User, AuthError> {
        if let Some(old) = self.session() {
            db.delete_session(&old.token)?;
        }
        let session = Session::new(user);
        db.insert_session(&session)?;
        write_token(&self.token_path, &session.token)?;
        self.state = AuthState::Authenticated(session);
        self.user()
            .ok_or_else(|| AuthError::Store(anyhow::anyhow!("session was not stored")))
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(stored_hash: &str, candidate: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => AuthError::InvalidCredentials,
            other => AuthError::Hash(other.to_string()),
        })
}

fn read_token(path: &Path) -> Option<String> {
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Token files are readable by the owner only on unix.
fn write_token(path: &Path, token: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to save session to {}", path.display()))?;
    // `mode` only applies on creation; tighten a file left by an older run.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())
        .with_context(|| format!("Failed to save session to {}", path.display()))
}

fn remove_token(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to remove session file {}", path.display()))),
    }
}
