use crate::api::auth::{self, CurrentUser};
use crate::api::todo::ACTIVE_LIST_PATH;
use crate::domain::session::driving_ports::SessionPort;
use crate::domain::user::driving_ports::{CreateUserError, UserPort};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{BasicErrorResponse, Form, GenericErrorResponse, render};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(home, signup_form, signup, login_form, login, logout))]
/// Defines the OpenAPI documentation for the account routes
pub struct AccountApi;
/// Constant used to group account endpoints in OpenAPI documentation
pub const ACCOUNT_API_GROUP: &str = "Accounts";

const PASSWORD_MISMATCH_ERROR: &str = "Passwords did not match.";
const USERNAME_TAKEN_ERROR: &str = "Username already exists.";
const SIGNUP_INVALID_ERROR: &str = "Bad data entered.";
const LOGIN_FAILED_ERROR: &str = "Username and Password was not found.";

/// Adds the landing page, signup, login, and logout routes to the application router
pub fn account_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route("/", get(home))
        .route(
            "/signup",
            get(signup_form).post(
                |State(app_state): AppState, Form(form): Form<dto::SignupForm>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let session_service = domain::session::SessionService {};

                    signup(form, &mut ext_cxn, &user_service, &session_service).await
                },
            ),
        )
        .route(
            "/login",
            get(login_form).post(
                |State(app_state): AppState, Form(form): Form<dto::LoginForm>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let session_service = domain::session::SessionService {};

                    login(form, &mut ext_cxn, &user_service, &session_service).await
                },
            ),
        )
        .route(
            "/logout",
            post(|State(app_state): AppState, user: CurrentUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let session_service = domain::session::SessionService {};

                logout(user, &mut ext_cxn, &session_service).await
            }),
        )
}

/// Redirect which also hands the browser its new session
fn logged_in_redirect(session_token: Uuid) -> Response {
    (
        [(header::SET_COOKIE, auth::session_cookie(session_token))],
        Redirect::to(ACTIVE_LIST_PATH),
    )
        .into_response()
}

fn account_page_with_error(status: StatusCode, username: String, error: &str) -> Response {
    render(
        status,
        dto::AccountPage {
            username,
            error: Some(error.to_owned()),
        },
    )
}

#[utoipa::path(
    get,
    path = "/",
    tag = ACCOUNT_API_GROUP,
    responses(
        (status = 200, description = "Landing page for the logged-in user", body = dto::HomePage),
        (status = 303, description = "Not logged in, redirected to the login page"),
    ),
)]
/// Greets the logged-in user
async fn home(user: CurrentUser) -> Response {
    render(
        StatusCode::OK,
        dto::HomePage {
            username: user.user.username,
        },
    )
}

#[utoipa::path(
    get,
    path = "/signup",
    tag = ACCOUNT_API_GROUP,
    responses((status = 200, description = "An empty signup form", body = dto::AccountPage)),
)]
/// Shows an empty signup form
async fn signup_form() -> Response {
    render(StatusCode::OK, dto::AccountPage::default())
}

#[utoipa::path(
    post,
    path = "/signup",
    tag = ACCOUNT_API_GROUP,
    request_body(content = dto::SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created and logged in, redirected to the active todo list"),
        (status = 400, description = "Signup rejected, form shown again with an error", body = dto::AccountPage),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Registers an account and logs straight into it
async fn signup(
    form: dto::SignupForm,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
    session_service: &impl SessionPort,
) -> Response {
    info!("Signing up {form}");
    let username = form.username.clone();
    let new_user = domain::user::NewUser::from(form);
    let user_writer = persistence::db_user_driven_ports::DbWriteUsers;

    let user_id = match user_service
        .create_user(&new_user, &mut *ext_cxn, &user_writer)
        .await
    {
        Ok(id) => id,
        Err(CreateUserError::PasswordMismatch) => {
            return account_page_with_error(
                StatusCode::BAD_REQUEST,
                username,
                PASSWORD_MISMATCH_ERROR,
            );
        }
        Err(CreateUserError::UsernameTaken) => {
            return account_page_with_error(
                StatusCode::BAD_REQUEST,
                username,
                USERNAME_TAKEN_ERROR,
            );
        }
        Err(CreateUserError::Invalid(errors)) => {
            info!("Rejected signup: {errors}");
            return account_page_with_error(
                StatusCode::BAD_REQUEST,
                username,
                SIGNUP_INVALID_ERROR,
            );
        }
        Err(CreateUserError::PortError(cause)) => {
            return GenericErrorResponse(cause).into_response();
        }
    };

    let session_writer = persistence::db_session_driven_ports::DbSessionWriter;
    match session_service
        .log_in(user_id, &mut *ext_cxn, &session_writer)
        .await
    {
        Ok(session_token) => logged_in_redirect(session_token),
        Err(cause) => GenericErrorResponse(cause).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/login",
    tag = ACCOUNT_API_GROUP,
    responses((status = 200, description = "An empty login form", body = dto::AccountPage)),
)]
/// Shows an empty login form
async fn login_form() -> Response {
    render(StatusCode::OK, dto::AccountPage::default())
}

#[utoipa::path(
    post,
    path = "/login",
    tag = ACCOUNT_API_GROUP,
    request_body(content = dto::LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirected to the active todo list"),
        (status = 401, description = "Unknown username or wrong password", body = dto::AccountPage),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Checks a username and password and starts a session if they match
async fn login(
    form: dto::LoginForm,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
    session_service: &impl SessionPort,
) -> Response {
    let username = form.username.clone();
    let credentials = domain::user::Credentials::from(form);
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;

    let user_id = match user_service
        .authenticate(&credentials, &mut *ext_cxn, &user_reader)
        .await
    {
        Ok(Some(id)) => id,
        Ok(None) => {
            info!("Failed login for {username}");
            return account_page_with_error(StatusCode::UNAUTHORIZED, username, LOGIN_FAILED_ERROR);
        }
        Err(cause) => return GenericErrorResponse(cause).into_response(),
    };

    let session_writer = persistence::db_session_driven_ports::DbSessionWriter;
    match session_service
        .log_in(user_id, &mut *ext_cxn, &session_writer)
        .await
    {
        Ok(session_token) => logged_in_redirect(session_token),
        Err(cause) => GenericErrorResponse(cause).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = ACCOUNT_API_GROUP,
    responses(
        (status = 303, description = "Session ended, redirected to the landing page"),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Ends the current session
async fn logout(
    user: CurrentUser,
    ext_cxn: &mut impl ExternalConnectivity,
    session_service: &impl SessionPort,
) -> Response {
    info!(user_id = user.id(), "Logging out");
    let session_writer = persistence::db_session_driven_ports::DbSessionWriter;

    match session_service
        .log_out(user.session_token, &mut *ext_cxn, &session_writer)
        .await
    {
        Ok(()) => (
            [(header::SET_COOKIE, auth::expired_session_cookie())],
            Redirect::to("/"),
        )
            .into_response(),
        Err(cause) => GenericErrorResponse(cause).into_response(),
    }
}
