//! Account service.
//!
//! Registration and sign-in go to the catalog API first. When the API is
//! unavailable the local user directory (`kv_users`) is used instead; it stores
//! Argon2 hashes, never plaintext passwords. Accounts confirmed by the API are
//! mirrored into the directory so they keep working offline.
//!
//! The signed-in user gates features only; it is not a security boundary.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use kv_market_core::Email;

use super::report_write;
use crate::catalog::{AuthSession, Catalog, FetchError, Registration};
use crate::models::{RegisteredUser, User};
use crate::notice::Notice;
use crate::state::AppState;
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account operations for the current session.
pub struct AuthService<'a, C, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
    catalog: &'a C,
}

impl<'a, C: Catalog, S: KeyValueStorage> AuthService<'a, C, S> {
    #[must_use]
    pub const fn new(
        state: &'a mut AppState,
        store: &'a PersistedStore<S>,
        catalog: &'a C,
    ) -> Self {
        Self {
            state,
            store,
            catalog,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input, `AuthError::Rejected` if the
    /// API refuses the account, and `AuthError::UserAlreadyExists` if the
    /// email is already in the local directory while the API is unreachable.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password.expose_secret())?;

        let registration = Registration {
            name: name.to_owned(),
            email,
            password,
        };

        let user = match self.register_remote(&registration).await {
            Some(Ok(user)) => {
                self.mirror_account(&registration.email, &registration.name, &registration.password)?;
                user
            }
            Some(Err(e)) => return Err(e),
            None => self.register_local(&registration)?,
        };

        info!(name = %user.name, remote = user.id.is_some(), "Account registered");
        self.set_user(user.clone());
        self.state
            .push_notice(Notice::success(format!("Welcome, {}!", user.name)));
        Ok(user)
    }

    /// `None` when the API could not be used and the local directory applies.
    async fn register_remote(
        &self,
        registration: &Registration,
    ) -> Option<Result<User, AuthError>> {
        if !self.state.api_available {
            return None;
        }
        match self.catalog.register_user(registration).await {
            Ok(user) => Some(Ok(user)),
            Err(FetchError::Http { status }) if (400..500).contains(&status) => {
                warn!(status, "Registration rejected by the API");
                Some(Err(AuthError::Rejected { status }))
            }
            Err(e) => {
                warn!(error = %e, "Registration API unavailable, using local directory");
                None
            }
        }
    }

    fn register_local(&self, registration: &Registration) -> Result<User, AuthError> {
        let mut directory: Vec<RegisteredUser> = self.store.load(StorageKey::UserDirectory);
        if find_account(&directory, &registration.email).is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        let account = RegisteredUser {
            name: registration.name.clone(),
            email: normalize(&registration.email),
            password_hash: hash_password(registration.password.expose_secret())?,
        };
        let user = User::from(&account);
        directory.push(account);
        self.store.save(StorageKey::UserDirectory, &directory)?;
        Ok(user)
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// Any API failure falls back to the local directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::InvalidCredentials` if neither the API nor the local
    /// directory accepts the password.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn sign_in(&mut self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = match self.sign_in_remote(&email, password).await {
            Some(session) => {
                self.mirror_account(&email, &session.user.name, password)?;
                self.set_token(session.access_token);
                session.user
            }
            None => self.sign_in_local(&email, password)?,
        };

        info!(name = %user.name, "Signed in");
        self.set_user(user.clone());
        self.state
            .push_notice(Notice::success(format!("Welcome, {}!", user.name)));
        Ok(user)
    }

    async fn sign_in_remote(&self, email: &Email, password: &SecretString) -> Option<AuthSession> {
        if !self.state.api_available {
            return None;
        }
        match self.catalog.authenticate(email, password).await {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "Remote sign-in failed, trying local directory");
                None
            }
        }
    }

    fn sign_in_local(&self, email: &Email, password: &SecretString) -> Result<User, AuthError> {
        let directory: Vec<RegisteredUser> = self.store.load(StorageKey::UserDirectory);
        let account = find_account(&directory, email).ok_or(AuthError::InvalidCredentials)?;
        verify_password(password.expose_secret(), &account.password_hash)?;
        Ok(User::from(account))
    }

    /// Forget the signed-in user and the access token.
    pub fn sign_out(&mut self) {
        self.state.user = None;
        let result = self.store.remove(StorageKey::User);
        report_write(self.state, StorageKey::User, result);
        self.set_token(None);
        info!("Signed out");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn set_user(&mut self, user: User) {
        self.state.user = Some(user);
        let result = self.store.save(StorageKey::User, &self.state.user);
        report_write(self.state, StorageKey::User, result);
    }

    fn set_token(&mut self, token: Option<SecretString>) {
        let result = match &token {
            Some(token) => self.store.save_raw(StorageKey::AccessToken, token.expose_secret()),
            None => self.store.remove(StorageKey::AccessToken),
        };
        report_write(self.state, StorageKey::AccessToken, result);
        self.catalog.set_bearer_token(token);
    }

    /// Record an API-confirmed account in the local directory.
    fn mirror_account(
        &mut self,
        email: &Email,
        name: &str,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        let mut directory: Vec<RegisteredUser> = self.store.load(StorageKey::UserDirectory);
        let account = RegisteredUser {
            name: name.to_owned(),
            email: normalize(email),
            password_hash: hash_password(password.expose_secret())?,
        };
        match directory.iter_mut().find(|a| a.email == account.email) {
            Some(existing) => *existing = account,
            None => directory.push(account),
        }
        let result = self.store.save(StorageKey::UserDirectory, &directory);
        report_write(self.state, StorageKey::UserDirectory, result);
        Ok(())
    }
}

fn normalize(email: &Email) -> String {
    email.as_str().to_lowercase()
}

fn find_account<'d>(directory: &'d [RegisteredUser], email: &Email) -> Option<&'d RegisteredUser> {
    let wanted = normalize(email);
    directory.iter().find(|a| a.email == wanted)
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
