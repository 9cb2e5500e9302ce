//! End-to-end exchanges against a mocked Ollama server

use serde_json::json;
use yuri_engine::{BackendError, ChatError, Session, Turn};

use crate::common::{
    backend, mount_ollama_reply, mount_ollama_status, options_with_prompts, received_bodies,
    start_ollama_mock,
};

const PROMPTS: &str = "prompts:\n  test_prompts: X\n";

#[tokio::test]
async fn first_exchange_sends_history_plus_injection() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "backend reply", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts"),
        backend(&server),
    )
    .unwrap();
    let reply = session.chat("hello").await.unwrap();

    assert_eq!(reply, "<think>\nbackend reply");
    assert_eq!(
        received_bodies(&server).await,
        vec![json!({
            "model": "deepseek-r1:32b",
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "X"}
            ],
            "stream": false,
            "options": {"temperature": 1.3}
        })]
    );
    assert_eq!(
        session.history().turns(),
        &[
            Turn::user("hello"),
            Turn::assistant("<think>\nbackend reply")
        ]
    );
}

#[tokio::test]
async fn injection_slides_to_the_end_each_call() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "one", 1).await;
    mount_ollama_reply(&server, "two", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts"),
        backend(&server),
    )
    .unwrap();
    session.chat("first").await.unwrap();
    session.chat("second").await.unwrap();

    let bodies = received_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(
        bodies[1]["messages"],
        json!([
            {"role": "user", "content": "first"},
            {"role": "assistant", "content": "<think>\none"},
            {"role": "user", "content": "second"},
            {"role": "assistant", "content": "X"}
        ])
    );
    assert_eq!(session.history().len(), 4);
    assert!(session.history().iter().all(|turn| turn.content() != "X"));
}

#[tokio::test]
async fn backend_error_status_keeps_user_turn_only() {
    let server = start_ollama_mock().await;
    mount_ollama_status(&server, 500, "model crashed").await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts"),
        backend(&server),
    )
    .unwrap();
    let err = session.chat("hello").await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::Backend(BackendError::Status { status: 500, .. })
    ));
    assert_eq!(session.history().turns(), &[Turn::user("hello")]);
}

#[tokio::test]
async fn unknown_category_sends_empty_trailing_turn() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "ok", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "dangerous_prompts"),
        backend(&server),
    )
    .unwrap();
    session.chat("hello").await.unwrap();

    let bodies = received_bodies(&server).await;
    assert_eq!(
        bodies[0]["messages"],
        json!([
            {"role": "user", "content": "hello"},
            {"role": "assistant", "content": ""}
        ])
    );
}

#[tokio::test]
async fn configured_temperature_reaches_the_backend() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "ok", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let options = options_with_prompts(dir.path(), PROMPTS, "test_prompts")
        .with_temperature(yuri_engine::Temperature::new(0.6).unwrap());
    let mut session = Session::new(options, backend(&server)).unwrap();
    session.chat("hello").await.unwrap();

    let bodies = received_bodies(&server).await;
    assert_eq!(bodies[0]["options"]["temperature"], json!(0.6));
}
