// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use flashdeck::catalog::store as card_store;

async fn body_string(resp: actix_web::dev::ServiceResponse) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8_lossy(&body).into_owned()
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get("Location")
        .expect("location header")
        .to_str()
        .expect("location string")
        .to_string()
}

#[actix_web::test]
async fn review_requires_login() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/admin/cards/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/users/login/?next=/admin/cards/");
}

#[actix_web::test]
async fn review_is_hidden_from_regular_users() {
    let harness = common::TestHarness::new();
    let user = harness.seed_user("alice", false);
    let cookie = harness.login_cookie(&user);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/cards/")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn operator_sees_the_review_queue() {
    let harness = common::TestHarness::new();
    let category = harness.seed_category("Science");
    harness.seed_card("Reviewed question", "A", category.id);
    let operator = harness.seed_user("op", true);
    let cookie = harness.login_cookie(&operator);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/cards/")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Reviewed question"));
    assert!(html.contains("unchecked"));
}

#[actix_web::test]
async fn review_queue_pages_at_the_operator_size() {
    let harness = common::TestHarness::new();
    let category = harness.seed_category("Science");
    let per_page = harness.config.catalog.operator_page_size as usize;
    for i in 0..per_page + 1 {
        harness.seed_card(&format!("Queued question {}", i), "A", category.id);
    }
    let operator = harness.seed_user("op", true);
    let cookie = harness.login_cookie(&operator);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/cards/")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let html = body_string(resp).await;
    assert_eq!(html.matches("Queued question").count(), per_page);
    assert!(html.contains("Page 1 of 2"));
}

#[actix_web::test]
async fn toggle_flips_the_check_flag_and_returns_to_the_page() {
    let harness = common::TestHarness::new();
    let category = harness.seed_category("Science");
    let card_id = harness.seed_card("Q", "A", category.id);
    let operator = harness.seed_user("op", true);
    let cookie = harness.login_cookie(&operator);
    let token = harness.csrf_token(&cookie);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let uri = format!("/admin/cards/{}/check/?page=2", card_id);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(cookie.clone())
            .set_form([("csrf_token", &token)])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/cards/?page=2");
    assert!(card_store::get_card(&harness.db, card_id)
        .expect("card")
        .check_status);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/cards/{}/check/", card_id))
            .cookie(cookie)
            .set_form([("csrf_token", &token)])
            .to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/admin/cards/");
    assert!(!card_store::get_card(&harness.db, card_id)
        .expect("card")
        .check_status);
}

#[actix_web::test]
async fn toggle_rejects_non_operators() {
    let harness = common::TestHarness::new();
    let category = harness.seed_category("Science");
    let card_id = harness.seed_card("Q", "A", category.id);
    let user = harness.seed_user("alice", false);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/cards/{}/check/", card_id))
            .cookie(harness.login_cookie(&user))
            .set_form([("csrf_token", "")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!card_store::get_card(&harness.db, card_id)
        .expect("card")
        .check_status);
}

#[actix_web::test]
async fn toggle_on_unknown_card_is_not_found() {
    let harness = common::TestHarness::new();
    let operator = harness.seed_user("op", true);
    let cookie = harness.login_cookie(&operator);
    let token = harness.csrf_token(&cookie);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/cards/999/check/")
            .cookie(cookie)
            .set_form([("csrf_token", &token)])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn toggle_requires_the_form_token() {
    let harness = common::TestHarness::new();
    let category = harness.seed_category("Science");
    let card_id = harness.seed_card("Q", "A", category.id);
    let operator = harness.seed_user("op", true);
    let cookie = harness.login_cookie(&operator);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let uri = format!("/admin/cards/{}/check/", card_id);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(cookie.clone())
            .set_form([("csrf_token", "")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(cookie)
            .set_form([("csrf_token", "fct_forged")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert!(!card_store::get_card(&harness.db, card_id)
        .expect("card")
        .check_status);
}
