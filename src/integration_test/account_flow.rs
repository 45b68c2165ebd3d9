use super::test_util::{self, cookie_from, form_request, get_request, send, sign_up};
use crate::api::test_util::{deserialize_body, location_of};
use crate::dto;
use axum::http::{StatusCode, header};
use speculoos::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn signup_logs_in_and_lands_on_empty_list() {
    test_util::prepare_db_and_test(|router| async move {
        let signup_response = send(
            &router,
            form_request("/signup", "username=alice&password1=pw1234&password2=pw1234", None),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, signup_response.status());
        assert_that!(location_of(&signup_response)).is_some().is_equal_to("/todos");
        let session = cookie_from(&signup_response);

        let list_response = send(&router, get_request("/todos", Some(&session))).await;
        assert_eq!(StatusCode::OK, list_response.status());
        let page: dto::TodoListPage = deserialize_body(list_response.into_body()).await;
        assert_that!(page.todos).is_empty();

        let home_response = send(&router, get_request("/", Some(&session))).await;
        let home: dto::HomePage = deserialize_body(home_response.into_body()).await;
        assert_eq!("alice", home.username);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn duplicate_signup_is_rejected() {
    test_util::prepare_db_and_test(|router| async move {
        sign_up(&router, "alice", "pw1234").await;

        let response = send(
            &router,
            form_request("/signup", "username=alice&password1=other&password2=other", None),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_that!(response.headers().get(header::SET_COOKIE)).is_none();

        let page: dto::AccountPage = deserialize_body(response.into_body()).await;
        assert_that!(page.error).is_some().is_equal_to("Username already exists.".to_owned());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn login_and_logout() {
    test_util::prepare_db_and_test(|router| async move {
        sign_up(&router, "bob", "hunter22").await;

        let bad_login = send(
            &router,
            form_request("/login", "username=bob&password=wrong", None),
        )
        .await;
        assert_eq!(StatusCode::UNAUTHORIZED, bad_login.status());

        let login_response = send(
            &router,
            form_request("/login", "username=bob&password=hunter22", None),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, login_response.status());
        let session = cookie_from(&login_response);

        let logout_response = send(&router, form_request("/logout", "", Some(&session))).await;
        assert_eq!(StatusCode::SEE_OTHER, logout_response.status());

        let after_logout = send(&router, get_request("/todos", Some(&session))).await;
        assert_eq!(StatusCode::SEE_OTHER, after_logout.status());
        assert_that!(location_of(&after_logout)).is_some().is_equal_to("/login");
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn logout_only_accepts_post() {
    test_util::prepare_db_and_test(|router| async move {
        let session = sign_up(&router, "carol", "pw1234").await;

        let response = send(&router, get_request("/logout", Some(&session))).await;
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());

        let still_logged_in = send(&router, get_request("/todos", Some(&session))).await;
        assert_eq!(StatusCode::OK, still_logged_in.status());
    });
}
