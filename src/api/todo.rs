use crate::api::auth::CurrentUser;
use crate::domain::todo::TodoStatus;
use crate::domain::todo::driving_ports::{TodoError, TodoPort};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    BasicErrorResponse, Form, FormErrorResponse, GenericErrorResponse, NotFoundResponse, render,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_macros::FromRequestParts;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(
    list_todos,
    new_todo_form,
    create_todo,
    view_todo,
    update_todo,
    complete_todo,
    delete_todo,
))]
/// Defines the OpenAPI documentation for the todo routes
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Where every successful todo mutation sends the user
pub const ACTIVE_LIST_PATH: &str = "/todos";

const CREATE_ERROR: &str = "Bad data entered.";
const EDIT_ERROR: &str = "Bad input.";

/// Path extractor whose rejection (a non-numeric todo ID, for example) is a plain 404
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(NotFoundResponse))]
struct Path<T>(T);

impl From<PathRejection> for NotFoundResponse {
    fn from(_: PathRejection) -> Self {
        NotFoundResponse
    }
}

/// Adds routes under "/todos" to the application router
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState, user: CurrentUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                list_todos(user.id(), TodoStatus::Active, &mut ext_cxn, &todo_service).await
            }),
        )
        .route(
            "/completed",
            get(|State(app_state): AppState, user: CurrentUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                list_todos(user.id(), TodoStatus::Completed, &mut ext_cxn, &todo_service).await
            }),
        )
        .route(
            "/create",
            get(|_user: CurrentUser| new_todo_form()).post(
                |State(app_state): AppState,
                       user: CurrentUser,
                       form: Result<Form<dto::TodoForm>, FormErrorResponse>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let form = form.map(|Form(form)| form);

                    create_todo(user.id(), form, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/:todo_id",
            get(
                |State(app_state): AppState,
                       user: CurrentUser,
                       Path(todo_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    view_todo(user.id(), todo_id, &mut ext_cxn, &todo_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                       user: CurrentUser,
                       Path(todo_id): Path<i32>,
                       form: Result<Form<dto::TodoForm>, FormErrorResponse>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let form = form.map(|Form(form)| form);

                    update_todo(user.id(), todo_id, form, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/:todo_id/complete",
            get(refuse_plain_fetch_route).post(
                |State(app_state): AppState,
                       user: CurrentUser,
                       Path(todo_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    complete_todo(user.id(), todo_id, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/:todo_id/delete",
            get(refuse_plain_fetch_route).post(
                |State(app_state): AppState,
                       user: CurrentUser,
                       Path(todo_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    delete_todo(user.id(), todo_id, &mut ext_cxn, &todo_service).await
                },
            ),
        )
}

/// Shared by the GET side of the complete and delete routes
async fn refuse_plain_fetch_route(
    State(app_state): AppState,
    user: CurrentUser,
    Path(todo_id): Path<i32>,
) -> Response {
    let mut ext_cxn = app_state.ext_cxn.clone();
    let todo_service = domain::todo::TodoService {};

    refuse_plain_fetch(user.id(), todo_id, &mut ext_cxn, &todo_service).await
}

/// Converts a todo failure on an ID-addressed route into a response
fn todo_failure(user_id: i32, todo_id: i32, err: TodoError) -> Response {
    match err {
        TodoError::NotFound => {
            info!(user_id, todo_id, "Todo not found for user");
            NotFoundResponse.into_response()
        }
        TodoError::Invalid(errors) => {
            warn!(user_id, todo_id, "Unexpected validation failure: {errors}");
            StatusCode::BAD_REQUEST.into_response()
        }
        TodoError::PortError(cause) => GenericErrorResponse(cause).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "The user's active todos in the order they were created", body = dto::TodoListPage),
        (status = 303, description = "Not logged in, redirected to the login page"),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Lists the user's todos with the given status. Also serves "/todos/completed", whose todos are
/// ordered by when they were completed, oldest first.
async fn list_todos(
    user_id: i32,
    status: TodoStatus,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    info!(user_id, "Listing {status} todos");
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    match todo_service
        .list(user_id, status, &mut *ext_cxn, &todo_reader)
        .await
    {
        Ok(todos) => render(
            StatusCode::OK,
            dto::TodoListPage {
                todos: todos.into_iter().map(dto::TodoItem::from).collect(),
            },
        ),
        Err(TodoError::PortError(cause)) => GenericErrorResponse(cause).into_response(),
        Err(other) => GenericErrorResponse(other.into()).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/todos/create",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "An empty todo form", body = dto::TodoFormPage),
    ),
)]
/// Shows an empty form for creating a todo
async fn new_todo_form() -> Response {
    render(
        StatusCode::OK,
        dto::TodoFormPage {
            form: dto::TodoForm::default(),
            error: None,
        },
    )
}

#[utoipa::path(
    post,
    path = "/todos/create",
    tag = TODO_API_GROUP,
    request_body(content = dto::TodoForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Todo created, redirected to the active list"),
        (status = 400, description = "Invalid todo data, form shown again with an error", body = dto::TodoFormPage),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a todo owned by the user. A body that can't be read as a todo form shows an empty
/// form again.
async fn create_todo(
    user_id: i32,
    form: Result<dto::TodoForm, FormErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    info!(user_id, "Creating todo");
    let form = match form {
        Ok(form) => form,
        Err(unreadable) => {
            info!(user_id, "Unreadable todo form: {}", unreadable.parse_problem);
            return render(
                StatusCode::BAD_REQUEST,
                dto::TodoFormPage {
                    form: dto::TodoForm::default(),
                    error: Some(CREATE_ERROR.to_owned()),
                },
            );
        }
    };
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;
    let fields = domain::todo::TodoFields::from(form.clone());

    match todo_service
        .create(user_id, &fields, &mut *ext_cxn, &todo_writer)
        .await
    {
        Ok(_) => Redirect::to(ACTIVE_LIST_PATH).into_response(),
        Err(TodoError::Invalid(errors)) => {
            info!(user_id, "Rejected new todo: {errors}");
            render(
                StatusCode::BAD_REQUEST,
                dto::TodoFormPage {
                    form,
                    error: Some(CREATE_ERROR.to_owned()),
                },
            )
        }
        Err(TodoError::PortError(cause)) => GenericErrorResponse(cause).into_response(),
        Err(TodoError::NotFound) => {
            GenericErrorResponse(TodoError::NotFound.into()).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = i32, Path, description = "ID of one of the user's todos")),
    responses(
        (status = 200, description = "The todo and an edit form filled with its current values", body = dto::TodoDetailPage),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Shows one of the user's todos
async fn view_todo(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    match todo_service
        .get(user_id, todo_id, &mut *ext_cxn, &todo_reader)
        .await
    {
        Ok(todo) => render(
            StatusCode::OK,
            dto::TodoDetailPage {
                form: dto::TodoForm::from(&todo),
                todo: dto::TodoItem::from(todo),
                error: None,
            },
        ),
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}

#[utoipa::path(
    post,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = i32, Path, description = "ID of one of the user's todos")),
    request_body(content = dto::TodoForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Todo saved, redirected to the active list"),
        (status = 400, description = "Invalid todo data, todo shown again with an error", body = dto::TodoDetailPage),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Overwrites the title, memo, and importance of one of the user's todos
async fn update_todo(
    user_id: i32,
    todo_id: i32,
    form: Result<dto::TodoForm, FormErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    info!(user_id, todo_id, "Updating todo");
    let form = match form {
        Ok(form) => form,
        Err(unreadable) => {
            info!(user_id, todo_id, "Unreadable todo edit: {}", unreadable.parse_problem);
            return rejected_edit(user_id, todo_id, None, &mut *ext_cxn, todo_service).await;
        }
    };
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;
    let fields = domain::todo::TodoFields::from(form.clone());

    let update_result = todo_service
        .update(user_id, todo_id, &fields, &mut *ext_cxn, &todo_writer)
        .await;
    match update_result {
        Ok(_) => Redirect::to(ACTIVE_LIST_PATH).into_response(),
        Err(TodoError::Invalid(errors)) => {
            info!(user_id, todo_id, "Rejected todo edit: {errors}");
            rejected_edit(user_id, todo_id, Some(form), &mut *ext_cxn, todo_service).await
        }
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}

/// Shows the stored todo again with an error next to the rejected form, or next to the stored
/// values when the form couldn't be read. Someone else's todo is still a 404.
async fn rejected_edit(
    user_id: i32,
    todo_id: i32,
    form: Option<dto::TodoForm>,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    match todo_service
        .get(user_id, todo_id, &mut *ext_cxn, &todo_reader)
        .await
    {
        Ok(todo) => render(
            StatusCode::BAD_REQUEST,
            dto::TodoDetailPage {
                form: form.unwrap_or_else(|| dto::TodoForm::from(&todo)),
                todo: dto::TodoItem::from(todo),
                error: Some(EDIT_ERROR.to_owned()),
            },
        ),
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}

#[utoipa::path(
    post,
    path = "/todos/{todo_id}/complete",
    tag = TODO_API_GROUP,
    params(("todo_id" = i32, Path, description = "ID of one of the user's todos")),
    responses(
        (status = 303, description = "Todo marked complete, redirected to the active list"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Marks one of the user's todos as completed now
async fn complete_todo(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    info!(user_id, todo_id, "Completing todo");
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    match todo_service
        .complete(user_id, todo_id, &mut *ext_cxn, &todo_writer)
        .await
    {
        Ok(_) => Redirect::to(ACTIVE_LIST_PATH).into_response(),
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}

#[utoipa::path(
    post,
    path = "/todos/{todo_id}/delete",
    tag = TODO_API_GROUP,
    params(("todo_id" = i32, Path, description = "ID of one of the user's todos")),
    responses(
        (status = 303, description = "Todo deleted, redirected to the active list"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Permanently deletes one of the user's todos
async fn delete_todo(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    info!(user_id, todo_id, "Deleting todo");
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    match todo_service
        .delete(user_id, todo_id, &mut *ext_cxn, &todo_writer)
        .await
    {
        Ok(()) => Redirect::to(ACTIVE_LIST_PATH).into_response(),
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}

/// A plain fetch of a mutating todo route. The todo must still belong to the user, but nothing
/// changes either way.
async fn refuse_plain_fetch(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Response {
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    match todo_service
        .get(user_id, todo_id, &mut *ext_cxn, &todo_reader)
        .await
    {
        Ok(_) => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        Err(err) => todo_failure(user_id, todo_id, err),
    }
}
