use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for registering an account
#[derive(Deserialize, Display, ToSchema)]
#[display("{username}")]
#[cfg_attr(test, derive(Serialize))]
pub struct SignupForm {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl From<SignupForm> for domain::user::NewUser {
    fn from(value: SignupForm) -> Self {
        domain::user::NewUser {
            username: value.username,
            password1: value.password1,
            password2: value.password2,
        }
    }
}

/// Form body for logging in
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct LoginForm {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginForm> for domain::user::Credentials {
    fn from(value: LoginForm) -> Self {
        domain::user::Credentials {
            username: value.username,
            password: value.password,
        }
    }
}

/// View model for the signup and login pages. Passwords are never echoed back.
#[derive(Debug, Default, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct AccountPage {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Username already exists.")]
    pub error: Option<String>,
}

/// View model for the landing page
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct HomePage {
    #[schema(example = "alice")]
    pub username: String,
}
