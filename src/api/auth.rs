use crate::domain::session::driving_ports::SessionPort;
use crate::domain::user::TodoUser;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::GenericErrorResponse;
use crate::{SharedData, domain, logging, persistence};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_id";
/// Where unauthenticated visitors get sent
pub const LOGIN_PATH: &str = "/login";

/// The logged-in user making a request, along with the session they're using. Handlers that take
/// this as an argument are only reachable with a valid session; anyone else is sent to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: TodoUser,
    pub session_token: Uuid,
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }
}

/// Finds the session token among the request's cookies, if one was sent and is well-formed
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value which hands the session token to the browser
pub fn session_cookie(token: Uuid) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value which makes the browser forget its session token
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolves the user behind the request's session cookie. [None] means the request is
/// unauthenticated, either because there's no cookie or because the session is gone.
pub async fn resolve_current_user(
    headers: &HeaderMap,
    ext_cxn: &mut impl ExternalConnectivity,
    session_service: &impl SessionPort,
) -> Result<Option<CurrentUser>, anyhow::Error> {
    let Some(session_token) = session_token_from_headers(headers) else {
        return Ok(None);
    };

    let session_reader = persistence::db_session_driven_ports::DbSessionReader;
    let user = session_service
        .current_user(session_token, ext_cxn, &session_reader)
        .await?;

    Ok(user.map(|user| CurrentUser {
        user,
        session_token,
    }))
}

/// Why a request couldn't be tied to a logged-in user
pub enum AuthRejection {
    LoginRequired,
    Failure(GenericErrorResponse),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired => Redirect::to(LOGIN_PATH).into_response(),
            Self::Failure(failure) => failure.into_response(),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<SharedData>> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        let mut ext_cxn = state.ext_cxn.clone();
        let session_service = domain::session::SessionService {};

        let current_user = resolve_current_user(&parts.headers, &mut ext_cxn, &session_service)
            .await
            .map_err(|err| AuthRejection::Failure(GenericErrorResponse(err)))?;

        match current_user {
            Some(current_user) => {
                logging::record_request_user(current_user.id());
                Ok(current_user)
            }
            None => {
                debug!(path = parts.uri.path(), "Unauthenticated request, redirecting to login");
                Err(AuthRejection::LoginRequired)
            }
        }
    }
}
