use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;
use serde::Serialize;
use tracing::error;
use utoipa::ToResponse;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[response(examples(
    ("Not Found" = (
        summary = "Todo could not be found, or belongs to someone else (404)",
        value = json!({
            "error_code": "not_found",
            "error_description": "The requested entity could not be found.",
            "extra_info": null
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )),

    ("Malformed Form" = (
        summary = "The submitted form body could not be read (400)",
        value = json!({
            "error_code": "invalid_form",
            "error_description": "The submitted form body was malformed or unreadable.",
            "extra_info": "Form requests must have `Content-Type: application/x-www-form-urlencoded`"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<String>,
}

/// Response type for ID-addressed routes where the entity is missing or not owned by the caller.
/// Both cases get the same response.
pub struct NotFoundResponse;

impl IntoResponse for NotFoundResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            axum::Json(BasicErrorResponse {
                error_code: "not_found".into(),
                error_description: "The requested entity could not be found.".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that turns unexpected failures into a 500 after logging them
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Unexpected failure while handling request: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for GenericErrorResponse {
    fn from(value: anyhow::Error) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Form] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(FormErrorResponse))]
pub struct Form<T>(pub T);

/// Response type representing form parse errors. Routes that show the form again take
/// `Result<Form<T>, FormErrorResponse>` instead of letting this become the response.
pub struct FormErrorResponse {
    pub parse_problem: String,
}

impl From<FormRejection> for FormErrorResponse {
    fn from(value: FormRejection) -> Self {
        FormErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for FormErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_form".into(),
                error_description: "The submitted form body was malformed or unreadable.".into(),
                extra_info: Some(self.parse_problem),
            }),
        )
            .into_response()
    }
}

/// Renders a view model as the body of a response with the given status
pub fn render<T: Serialize>(status: StatusCode, view: T) -> Response {
    (status, axum::Json(view)).into_response()
}
