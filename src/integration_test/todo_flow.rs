use super::test_util::{self, form_request, get_request, send, sign_up, text_request};
use crate::api::test_util::deserialize_body;
use crate::dto;
use axum::Router;
use axum::http::StatusCode;
use speculoos::prelude::*;

async fn list(router: &Router, uri: &str, session: &str) -> Vec<dto::TodoItem> {
    let response = send(router, get_request(uri, Some(session))).await;
    assert_eq!(StatusCode::OK, response.status());

    let page: dto::TodoListPage = deserialize_body(response.into_body()).await;
    page.todos
}

async fn create(router: &Router, title: &str, session: &str) -> i32 {
    let response = send(
        router,
        form_request("/todos/create", &format!("title={title}&memo="), Some(session)),
    )
    .await;
    assert_eq!(StatusCode::SEE_OTHER, response.status());

    list(router, "/todos", session)
        .await
        .into_iter()
        .rev()
        .find(|todo| todo.title == title.replace('+', " "))
        .map(|todo| todo.id)
        .expect("created todo should be listed")
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn completing_moves_todo_to_completed_list() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "alice", "pw1234").await;
        let todo_id = create(&router, "Buy+milk", &session).await;

        let active = list(&router, "/todos", &session).await;
        assert_eq!(1, active.len());
        assert_eq!("Buy milk", active[0].title);
        assert_that!(active[0].completed_at).is_none();

        let complete_response = send(
            &router,
            form_request(&format!("/todos/{todo_id}/complete"), "", Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, complete_response.status());

        assert_that!(list(&router, "/todos", &session).await).is_empty();
        let completed = list(&router, "/todos/completed", &session).await;
        assert_eq!(1, completed.len());
        assert_eq!(todo_id, completed[0].id);
        assert_that!(completed[0].completed_at)
            .is_some()
            .matches(|completed_at| *completed_at >= completed[0].created_at);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn completed_list_follows_completion_order() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "alice", "pw1234").await;
        let first = create(&router, "First", &session).await;
        let second = create(&router, "Second", &session).await;

        for todo_id in [second, first] {
            send(
                &router,
                form_request(&format!("/todos/{todo_id}/complete"), "", Some(&session)),
            )
            .await;
        }

        let completed_ids: Vec<i32> = list(&router, "/todos/completed", &session)
            .await
            .into_iter()
            .map(|todo| todo.id)
            .collect();
        assert_eq!(vec![second, first], completed_ids);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn other_users_todos_are_invisible() {
    test_util::prepare_db_and_test(|router| async move {
        let alice = sign_up(&router, "alice", "pw1234").await;
        let bob = sign_up(&router, "bob", "pw5678").await;
        let todo_id = create(&router, "Secret", &alice).await;

        assert_that!(list(&router, "/todos", &bob).await).is_empty();

        let view = send(&router, get_request(&format!("/todos/{todo_id}"), Some(&bob))).await;
        assert_eq!(StatusCode::NOT_FOUND, view.status());

        for uri in [
            format!("/todos/{todo_id}"),
            format!("/todos/{todo_id}/complete"),
            format!("/todos/{todo_id}/delete"),
        ] {
            let response = send(&router, form_request(&uri, "title=Mine", Some(&bob))).await;
            assert_eq!(StatusCode::NOT_FOUND, response.status(), "POST {uri}");
        }

        let untouched = list(&router, "/todos", &alice).await;
        assert_eq!(1, untouched.len());
        assert_eq!("Secret", untouched[0].title);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn edit_and_delete() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "alice", "pw1234").await;
        let todo_id = create(&router, "Draft", &session).await;

        let bad_edit = send(
            &router,
            form_request(&format!("/todos/{todo_id}"), "title=+++&memo=", Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, bad_edit.status());
        let page: dto::TodoDetailPage = deserialize_body(bad_edit.into_body()).await;
        assert_eq!("Draft", page.todo.title);
        assert_that!(page.error).is_some().is_equal_to("Bad input.".to_owned());

        let edit = send(
            &router,
            form_request(
                &format!("/todos/{todo_id}"),
                "title=Final&memo=notes&important=on",
                Some(&session),
            ),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, edit.status());

        let view = send(&router, get_request(&format!("/todos/{todo_id}"), Some(&session))).await;
        let page: dto::TodoDetailPage = deserialize_body(view.into_body()).await;
        assert_eq!("Final", page.todo.title);
        assert_eq!("notes", page.todo.memo);
        assert!(page.todo.important);

        let plain_fetch = send(
            &router,
            get_request(&format!("/todos/{todo_id}/delete"), Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, plain_fetch.status());

        let delete = send(
            &router,
            form_request(&format!("/todos/{todo_id}/delete"), "", Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, delete.status());

        let gone = send(&router, get_request(&format!("/todos/{todo_id}"), Some(&session))).await;
        assert_eq!(StatusCode::NOT_FOUND, gone.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn any_checkbox_value_other_than_off_marks_important() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "alice", "pw1234").await;

        let response = send(
            &router,
            form_request("/todos/create", "title=Buy+milk&important=maybe", Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());

        let active = list(&router, "/todos", &session).await;
        assert_eq!(1, active.len());
        assert!(active[0].important);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn unreadable_create_body_shows_form_again() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "alice", "pw1234").await;

        let response = send(
            &router,
            text_request("/todos/create", "title=Buy milk", Some(&session)),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let page: dto::TodoFormPage = deserialize_body(response.into_body()).await;
        assert_that!(page.error)
            .is_some()
            .is_equal_to("Bad data entered.".to_owned());

        assert_that!(list(&router, "/todos", &session).await).is_empty();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn unreadable_edit_body_checks_ownership_first() {
    test_util::prepare_db_and_test(|router| async move {
        let alice = sign_up(&router, "alice", "pw1234").await;
        let bob = sign_up(&router, "bob", "pw1234").await;
        let todo_id = create(&router, "Draft", &alice).await;

        let foreign = send(
            &router,
            text_request(&format!("/todos/{todo_id}"), "title=Mine", Some(&bob)),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, foreign.status());

        let own = send(
            &router,
            text_request(&format!("/todos/{todo_id}"), "title=Mine", Some(&alice)),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, own.status());
        let page: dto::TodoDetailPage = deserialize_body(own.into_body()).await;
        assert_eq!("Draft", page.form.title);
        assert_that!(page.error).is_some().is_equal_to("Bad input.".to_owned());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn unauthenticated_requests_go_to_login() {
    test_util::prepare_db_and_test(|router| async move {
        for uri in ["/", "/todos", "/todos/completed", "/todos/create", "/todos/1"] {
            let response = send(&router, get_request(uri, None)).await;
            assert_eq!(StatusCode::SEE_OTHER, response.status(), "GET {uri}");
        }

        let non_numeric = {
            let session = sign_up(&router, "alice", "pw1234").await;
            send(&router, get_request("/todos/abc", Some(&session))).await
        };
        assert_eq!(StatusCode::NOT_FOUND, non_numeric.status());
    });
}
