//! Route availability, template selection and login redirects.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::Value;

use common::{Fixture, location};
use web_server::build_app;
use web_server::templates::{self, template_used};
use yatube_shared::dto::NextQuery;

#[actix_web::test]
async fn public_pages_are_open_to_guests() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let pages = [
        "/".to_string(),
        format!("/group/{}/", fx.group.slug),
        format!("/profile/{}/", fx.author.username),
        format!("/posts/{}/", fx.post.id),
        "/auth/login/".to_string(),
        "/auth/signup/".to_string(),
    ];

    for uri in pages {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
    }
}

#[actix_web::test]
async fn pages_use_the_expected_templates() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let cases = [
        ("/".to_string(), templates::INDEX),
        (format!("/group/{}/", fx.group.slug), templates::GROUP_LIST),
        (format!("/profile/{}/", fx.author.username), templates::PROFILE),
        (format!("/posts/{}/", fx.post.id), templates::POST_DETAIL),
        ("/create/".to_string(), templates::CREATE_POST),
        (format!("/posts/{}/edit/", fx.post.id), templates::CREATE_POST),
    ];

    for (uri, template) in cases {
        let req = test::TestRequest::get()
            .uri(&uri)
            .cookie(fx.cookie_for(&fx.author))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
        assert_eq!(template_used(res.response()), Some(template), "GET {uri}");
    }
}

#[actix_web::test]
async fn guests_are_sent_to_login_from_protected_pages() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let edit = format!("/posts/{}/edit/", fx.post.id);
    for uri in ["/create/", edit.as_str()] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "GET {uri}");
        assert_eq!(location(&res), format!("/auth/login/?next={uri}"));
    }
}

#[actix_web::test]
async fn login_redirect_keeps_the_query_string() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = test::TestRequest::get().uri("/create/?a=1").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(location(&res), "/auth/login/?next=/create/%3Fa%3D1");
}

#[actix_web::test]
async fn login_redirect_preserves_escapes_in_the_query() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = test::TestRequest::get().uri("/create/?q=a%26b").to_request();
    let res = test::call_service(&app, req).await;

    let target = location(&res);
    let (path, query) = target.split_once('?').unwrap();
    assert_eq!(path, "/auth/login/");
    let next = web::Query::<NextQuery>::from_query(query).unwrap().into_inner().next;
    assert_eq!(next.as_deref(), Some("/create/?q=a%26b"));
}

#[actix_web::test]
async fn non_author_is_sent_back_to_the_post() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .cookie(fx.cookie_for(&fx.other))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", fx.post.id));
}

#[actix_web::test]
async fn unknown_pages_render_the_not_found_page() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let missing = [
        "/unexisting_page/",
        "/group/no-such-group/",
        "/profile/nobody/",
        "/posts/9999/",
        "/posts/not-a-number/",
    ];

    for uri in missing {
        for authorized in [false, true] {
            let mut req = test::TestRequest::get().uri(uri);
            if authorized {
                req = req.cookie(fx.cookie_for(&fx.author));
            }
            let res = test::call_service(&app, req.to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {uri}");
            assert_eq!(template_used(res.response()), Some(templates::NOT_FOUND), "GET {uri}");
        }
    }
}

#[actix_web::test]
async fn api_not_found_stays_json() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/nothing").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(template_used(res.response()), None);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["detail"], "No route for /api/nothing");
}

#[actix_web::test]
async fn responses_carry_a_request_id() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert!(res.headers().contains_key("x-request-id"));
}
