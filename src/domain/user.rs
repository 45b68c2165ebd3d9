use crate::domain::user::driving_ports::CreateUserError;
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use derive_more::Display;
use std::sync::LazyLock;
use tokio::task;
use tracing::{info, warn};
use validator::{Validate, ValidationError};

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoUser {
    pub id: i32,
    pub username: String,
}

/// A signup request. The password is entered twice and both copies must match.
#[derive(Debug, Clone, Display, Validate)]
#[display("{username}")]
pub struct NewUser {
    #[validate(length(min = 1, max = 150), custom = "validate_username_characters")]
    pub username: String,
    #[validate(length(min = 1))]
    pub password1: String,
    pub password2: String,
}

/// A login attempt
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What the directory keeps on file to check a login attempt against
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user_id: i32,
    pub password_hash: String,
}

/// Usernames may only hold letters, digits, and the characters `@ . + - _`
fn validate_username_characters(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username_characters"))
    }
}

/// Checked in place of a real hash when nobody has the requested username, so a login for an
/// unknown user costs as much as one with a wrong password
static UNKNOWN_USER_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("no such user").unwrap_or_default());

/// Produces a salted argon2 PHC string for the password. Async callers run this through
/// [task::spawn_blocking].
fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("hashing password: {err}"))?;

    Ok(hash.to_string())
}

/// Checks the password against a stored PHC string. A hash that can't be parsed never matches.
/// As slow as [hash_password].
fn password_matches(password: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Stored password hash could not be parsed: {err}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn credentials_for_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<StoredCredentials>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Saves a new user and returns its ID, or [None] if the username is already taken
        async fn create_user(
            &self,
            username: &str,
            password_hash: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<i32>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        #[error("the provided user information was invalid: {0}")]
        Invalid(ValidationErrors),
        #[error("the two passwords did not match")]
        PasswordMismatch,
        #[error("a user with that username already exists")]
        UsernameTaken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<ValidationErrors> for CreateUserError {
        fn from(value: ValidationErrors) -> Self {
            Self::Invalid(value)
        }
    }


    pub trait UserPort {
        async fn create_user(
            &self,
            new_user: &NewUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<i32, CreateUserError>;

        /// Returns the ID of the user the credentials belong to, or [None] if they don't
        /// identify anybody
        async fn authenticate(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Option<i32>, anyhow::Error>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn create_user(
        &self,
        new_user: &NewUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<i32, CreateUserError> {
        if new_user.password1 != new_user.password2 {
            return Err(CreateUserError::PasswordMismatch);
        }
        new_user.validate()?;

        let password = new_user.password1.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("joining the password hashing task")??;
        let created_id = u_writer
            .create_user(&new_user.username, &password_hash, ext_cxn)
            .await
            .context("Trying to create user at service level")?;

        match created_id {
            Some(id) => {
                info!(user_id = id, "Registered user {new_user}");
                Ok(id)
            }
            None => Err(CreateUserError::UsernameTaken),
        }
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Option<i32>, anyhow::Error> {
        let stored = u_reader
            .credentials_for_username(&credentials.username, ext_cxn)
            .await
            .context("Looking up credentials during login")?;

        let (user_id, stored_hash) = match stored {
            Some(stored) => (Some(stored.user_id), Some(stored.password_hash)),
            None => (None, None),
        };
        let password = credentials.password.clone();
        let password_ok = task::spawn_blocking(move || match stored_hash {
            Some(stored_hash) => password_matches(&password, &stored_hash),
            None => {
                password_matches(&password, &UNKNOWN_USER_HASH);
                false
            }
        })
        .await
        .context("joining the password check task")?;

        Ok(user_id.filter(|_| password_ok))
    }
}
