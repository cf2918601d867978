//! Conversation and message endpoints: listing, creation and validation.

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, test_state};
use forum_service::models::Role;
use serde_json::{json, Value};
use uuid::Uuid;

#[actix_web::test]
async fn test_create_and_list_conversations() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let token = repo.issue_token(alice.id);

    for title in ["First", "Second"] {
        let req = test::TestRequest::post()
            .uri("/api/conversations")
            .insert_header(bearer(&token))
            .set_json(json!({"title": format!("  {}  ", title)}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], title);
        assert_eq!(body["authorId"], alice.id.to_string());
        assert_eq!(body["author"]["name"], "Alice");
    }

    let req = test::TestRequest::get().uri("/api/conversations").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Second");
    assert_eq!(list[1]["title"], "First");
    assert_eq!(list[0]["messagesCount"], 0);
}

#[actix_web::test]
async fn test_blank_title_is_stored_as_null() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let user = repo.insert_user("Alice", Role::User);
    let req = test::TestRequest::post()
        .uri("/api/conversations")
        .insert_header(bearer(&repo.issue_token(user.id)))
        .set_json(json!({"title": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["title"].is_null());
}

#[actix_web::test]
async fn test_overlong_title_is_rejected() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let user = repo.insert_user("Alice", Role::User);
    let req = test::TestRequest::post()
        .uri("/api/conversations")
        .insert_header(bearer(&repo.issue_token(user.id)))
        .set_json(json!({"title": "t".repeat(201)}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Title must contain at most 200 characters");
}

#[actix_web::test]
async fn test_conversation_detail_lists_live_messages_oldest_first() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let bob = repo.insert_user("Bob", Role::User);
    let conversation = repo.seed_conversation(alice.id, Some("Hello"));
    repo.seed_message(alice.id, conversation.id, "one");
    let removed = repo.seed_message(bob.id, conversation.id, "two");
    repo.seed_message(bob.id, conversation.id, "three");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/messages/{}", removed.id))
        .insert_header(bearer(&repo.issue_token(bob.id)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/conversations/{}", conversation.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], conversation.id.to_string());
    assert_eq!(body["author"]["name"], "Alice");

    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "three"]);
    assert_eq!(body["messages"][1]["author"]["name"], "Bob");
}

#[actix_web::test]
async fn test_get_unknown_conversation_is_not_found() {
    let (state, _repo) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/conversations/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_malformed_path_is_a_validation_error() {
    let (state, _repo) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/conversations/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path"));
}

#[actix_web::test]
async fn test_post_message_and_filter_by_conversation() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let token = repo.issue_token(alice.id);
    let first = repo.seed_conversation(alice.id, Some("First"));
    let second = repo.seed_conversation(alice.id, Some("Second"));
    repo.seed_message(alice.id, second.id, "elsewhere");

    let req = test::TestRequest::post()
        .uri("/api/messages")
        .insert_header(bearer(&token))
        .set_json(json!({"content": "  hi there  ", "conversationId": first.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["content"], "hi there");
    assert_eq!(created["conversationId"], first.id.to_string());
    assert_eq!(created["author"]["id"], alice.id.to_string());

    let req = test::TestRequest::get()
        .uri(&format!("/api/messages?conversationId={}", first.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], created["id"]);

    let req = test::TestRequest::get().uri("/api/messages").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let all = body.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["content"], "hi there");
}

#[actix_web::test]
async fn test_message_content_rules() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let token = repo.issue_token(alice.id);
    let conversation = repo.seed_conversation(alice.id, None);

    for content in ["   ".to_string(), "x".repeat(5001)] {
        let req = test::TestRequest::post()
            .uri("/api/messages")
            .insert_header(bearer(&token))
            .set_json(json!({"content": content, "conversationId": conversation.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::post()
        .uri("/api/messages")
        .insert_header(bearer(&token))
        .set_json(json!({"conversationId": conversation.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_posting_into_unknown_conversation_is_not_found() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let req = test::TestRequest::post()
        .uri("/api/messages")
        .insert_header(bearer(&repo.issue_token(alice.id)))
        .set_json(json!({"content": "hello?", "conversationId": Uuid::new_v4()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "The conversation does not exist");
}

#[actix_web::test]
async fn test_message_count_ignores_deleted_messages() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let moderator = repo.insert_user("Mod", Role::Moderator);
    let conversation = repo.seed_conversation(alice.id, None);
    repo.seed_message(alice.id, conversation.id, "keep");
    let removed = repo.seed_message(alice.id, conversation.id, "remove");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/messages/{}", removed.id))
        .insert_header(bearer(&repo.issue_token(moderator.id)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/conversations").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["messagesCount"], 1);
}

#[actix_web::test]
async fn test_title_edit_distinguishes_absent_from_null() {
    let (state, repo) = test_state();
    let app = init_app!(state);

    let alice = repo.insert_user("Alice", Role::User);
    let token = repo.issue_token(alice.id);
    let conversation = repo.seed_conversation(alice.id, Some("Keep"));
    let uri = format!("/api/conversations/{}", conversation.id);

    let cases = [
        (json!({}), Value::from("Keep")),
        (json!({"title": " Renamed "}), Value::from("Renamed")),
        (json!({"title": null}), Value::Null),
        (json!({"title": "Back"}), Value::from("Back")),
        (json!({"title": "   "}), Value::Null),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{payload}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], expected, "{payload}");
    }
}
