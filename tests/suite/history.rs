//! History files written and read back through sessions

use std::fs;

use yuri_context::HistoryStore;
use yuri_engine::{Session, Turn};

use crate::common::{
    backend, history_dir, mount_ollama_reply, options_with_prompts, start_ollama_mock,
};

const PROMPTS: &str = "prompts:\n  test_prompts: \"嗯，让我想想\"\n";

#[tokio::test]
async fn saved_file_is_indented_utf8_without_injection() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "你好", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts").with_save_history(true),
        backend(&server),
    )
    .unwrap();
    session.chat("在吗").await.unwrap();

    let raw = fs::read_to_string(history_dir(dir.path()).join("test1.json")).unwrap();
    assert!(raw.starts_with("{\n    \"conversation\": ["));
    assert!(raw.contains("在吗"));
    assert!(raw.contains("你好"));
    assert!(!raw.contains("\\u"));
    assert!(!raw.contains("让我想想"));

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["conversation"][1]["content"], "<think>\n你好");
}

#[tokio::test]
async fn consecutive_sessions_never_overwrite_each_other() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "r", 2).await;
    let dir = tempfile::tempdir().unwrap();

    let mut first = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts").with_save_history(true),
        backend(&server),
    )
    .unwrap();
    first.chat("one").await.unwrap();

    let mut second = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts").with_save_history(true),
        backend(&server),
    )
    .unwrap();
    second.chat("two").await.unwrap();

    let store = HistoryStore::new();
    let tests_dir = history_dir(dir.path());
    let saved_first = store.load(tests_dir.join("test1.json")).unwrap();
    let saved_second = store.load(tests_dir.join("test2.json")).unwrap();
    assert_eq!(saved_first.turns()[0], Turn::user("one"));
    assert_eq!(saved_second.turns()[0], Turn::user("two"));
}

#[tokio::test]
async fn hydrated_session_saves_to_a_new_locator() {
    let server = start_ollama_mock().await;
    mount_ollama_reply(&server, "first reply", 1).await;
    mount_ollama_reply(&server, "resumed reply", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let mut original = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts").with_save_history(true),
        backend(&server),
    )
    .unwrap();
    original.chat("before").await.unwrap();
    let source = original.locator().unwrap().to_path_buf();
    let source_bytes = fs::read(&source).unwrap();

    let mut resumed = Session::new(
        options_with_prompts(dir.path(), PROMPTS, "test_prompts")
            .with_history_file(&source)
            .with_save_history(true),
        backend(&server),
    )
    .unwrap();
    assert_eq!(resumed.history(), original.history());
    resumed.chat("after").await.unwrap();

    assert_eq!(
        resumed.locator(),
        Some(history_dir(dir.path()).join("test2.json").as_path())
    );
    assert_eq!(fs::read(&source).unwrap(), source_bytes);

    let saved = HistoryStore::new().load(resumed.locator().unwrap()).unwrap();
    assert_eq!(saved.len(), 4);
    assert_eq!(saved.turns()[3], Turn::assistant("<think>\nresumed reply"));
}
