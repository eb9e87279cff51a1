// ABOUTME: Database layer tests against in-memory SQLite
// ABOUTME: Covers users, billing balance rules, sessions, conversations, and cascading deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use airlab_assistant_builder::database_plugins::factory::{detect_database_type, DatabaseType};
use airlab_assistant_builder::database_plugins::DatabaseProvider;
use airlab_assistant_builder::errors::ErrorCode;
use airlab_assistant_builder::models::{
    billing_period_start, Assistant, AssistantTool, BillingPlan, Channel, Conversation, Session,
    StoredMessage, User, UserRole,
};
use chrono::{Duration, Utc};
use common::create_test_database;
use serde_json::json;
use uuid::Uuid;

fn sample_assistant(user_id: Uuid) -> Assistant {
    let now = Utc::now();
    Assistant {
        id: Uuid::new_v4(),
        user_id,
        openai_assistant_id: Some("asst_1".to_owned()),
        name: "Support".to_owned(),
        description: None,
        instructions: "Answer politely".to_owned(),
        model: "gpt-4o-mini".to_owned(),
        temperature: 0.7,
        tools: vec![AssistantTool::FileSearch],
        vector_store_id: Some("vs_1".to_owned()),
        settings: json!({"widget": {"title": "Hi"}}),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn sample_conversation(assistant: &Assistant, channel: Channel, chat: Option<&str>) -> Conversation {
    let now = Utc::now();
    Conversation {
        id: Uuid::new_v4(),
        assistant_id: assistant.id,
        user_id: assistant.user_id,
        thread_id: Some("thread_1".to_owned()),
        channel,
        external_chat_id: chat.map(str::to_owned),
        title: "New conversation".to_owned(),
        messages: vec![StoredMessage::user("hello")],
        created_at: now,
        updated_at: now,
    }
}

async fn insert_user(db: &airlab_assistant_builder::database_plugins::factory::Database) -> User {
    let user = User::new(
        format!("{}@Example.com", Uuid::new_v4().simple()),
        "hash".to_owned(),
        Some("Tester".to_owned()),
    );
    db.create_user(&user).await.unwrap();
    user
}

#[test]
fn test_detect_database_type() {
    assert!(matches!(
        detect_database_type("sqlite::memory:").unwrap(),
        DatabaseType::SQLite
    ));
    assert!(matches!(
        detect_database_type("postgres://u:p@localhost/db").unwrap(),
        DatabaseType::PostgreSQL
    ));
    let err = detect_database_type("mysql://localhost/db").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[tokio::test]
async fn test_user_round_trip_and_lowercased_email() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    let by_id = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, user.email.to_lowercase());
    assert_eq!(by_id.role, UserRole::User);
    assert_eq!(by_id.plan, BillingPlan::Free);

    let by_email = db
        .get_user_by_email(&user.email.to_lowercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(db.get_user_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    let twin = User::new(user.email.clone(), "hash".to_owned(), None);
    let err = db.create_user(&twin).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_change_plan_requires_balance() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    assert!(!db
        .change_user_plan(user.id, BillingPlan::Pro, 1_900)
        .await
        .unwrap());
    let unchanged = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(unchanged.plan, BillingPlan::Free);
    assert_eq!(unchanged.balance_cents, 0);

    assert_eq!(db.adjust_user_balance(user.id, 2_000).await.unwrap(), 2_000);
    assert!(db
        .change_user_plan(user.id, BillingPlan::Pro, 1_900)
        .await
        .unwrap());
    let upgraded = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(upgraded.plan, BillingPlan::Pro);
    assert_eq!(upgraded.balance_cents, 100);
}

#[tokio::test]
async fn test_balance_never_goes_negative() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    db.adjust_user_balance(user.id, 500).await.unwrap();
    assert_eq!(db.adjust_user_balance(user.id, -2_000).await.unwrap(), 0);

    let err = db.adjust_user_balance(Uuid::new_v4(), 100).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_usage_counter_increments_and_resets() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    for _ in 0..3 {
        db.increment_messages_used(user.id).await.unwrap();
    }
    assert_eq!(db.get_user(user.id).await.unwrap().unwrap().messages_used, 3);

    db.reset_messages_used(user.id).await.unwrap();
    assert_eq!(db.get_user(user.id).await.unwrap().unwrap().messages_used, 0);
}

#[tokio::test]
async fn test_usage_period_rolls_once() {
    let db = create_test_database().await;
    let mut user = User::new("roll@example.com".to_owned(), "hash".to_owned(), None);
    user.messages_used = 42;
    user.usage_period_start = Utc::now() - Duration::days(40);
    db.create_user(&user).await.unwrap();

    let next = billing_period_start(Utc::now());
    assert!(db.roll_usage_period(user.id, next).await.unwrap());
    assert!(!db.roll_usage_period(user.id, next).await.unwrap());

    let stored = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.messages_used, 0);
    assert_eq!(stored.usage_period_start, next);
}

#[tokio::test]
async fn test_purge_only_expired_sessions() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;

    let live = Session::new(user.id, 24, Some("curl".to_owned()));
    let mut stale = Session::new(user.id, 24, None);
    stale.expires_at = Utc::now() - Duration::hours(1);
    db.create_session(&live).await.unwrap();
    db.create_session(&stale).await.unwrap();

    assert_eq!(db.purge_expired_sessions(Utc::now()).await.unwrap(), 1);
    assert!(db.get_session(live.id).await.unwrap().is_some());
    assert!(db.get_session(stale.id).await.unwrap().is_none());

    assert_eq!(db.delete_user_sessions(user.id).await.unwrap(), 1);
    assert!(db.get_session(live.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_assistant_json_columns_round_trip() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;
    let assistant = sample_assistant(user.id);
    db.create_assistant(&assistant).await.unwrap();

    let stored = db.get_assistant(assistant.id).await.unwrap().unwrap();
    assert_eq!(stored.tools, vec![AssistantTool::FileSearch]);
    assert_eq!(stored.settings["widget"]["title"], "Hi");
    assert_eq!(stored.vector_store_id.as_deref(), Some("vs_1"));
    assert!((stored.temperature - 0.7).abs() < f32::EPSILON);

    assert_eq!(db.list_assistants_for_user(user.id).await.unwrap().len(), 1);
    assert!(db
        .list_assistants_for_user(Uuid::new_v4())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_find_conversation_by_external_chat() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;
    let assistant = sample_assistant(user.id);
    db.create_assistant(&assistant).await.unwrap();

    let telegram = sample_conversation(&assistant, Channel::Telegram, Some("42"));
    let web = sample_conversation(&assistant, Channel::Web, None);
    db.create_conversation(&telegram).await.unwrap();
    db.create_conversation(&web).await.unwrap();

    let found = db
        .find_conversation_by_external(assistant.id, Channel::Telegram, "42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, telegram.id);
    assert_eq!(found.messages, telegram.messages);

    assert!(db
        .find_conversation_by_external(assistant.id, Channel::Vk, "42")
        .await
        .unwrap()
        .is_none());

    let listed = db
        .list_conversations(user.id, Some(assistant.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_conversation_history_update_persists() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;
    let assistant = sample_assistant(user.id);
    db.create_assistant(&assistant).await.unwrap();
    let mut conversation = sample_conversation(&assistant, Channel::Web, None);
    db.create_conversation(&conversation).await.unwrap();

    conversation.title = "Opening hours".to_owned();
    conversation
        .messages
        .push(StoredMessage::assistant("We open at 9"));
    db.update_conversation(&conversation).await.unwrap();

    let stored = db.get_conversation(conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Opening hours");
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[1].content, "We open at 9");
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let db = create_test_database().await;
    let user = insert_user(&db).await;
    let assistant = sample_assistant(user.id);
    db.create_assistant(&assistant).await.unwrap();
    let conversation = sample_conversation(&assistant, Channel::Widget, Some("session-1"));
    db.create_conversation(&conversation).await.unwrap();
    let session = Session::new(user.id, 24, None);
    db.create_session(&session).await.unwrap();

    assert!(db.delete_user(user.id).await.unwrap());

    assert!(db.get_assistant(assistant.id).await.unwrap().is_none());
    assert!(db.get_conversation(conversation.id).await.unwrap().is_none());
    assert!(db.get_session(session.id).await.unwrap().is_none());
    assert!(!db.delete_user(user.id).await.unwrap());
}
