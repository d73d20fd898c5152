//! Agent-type backfill on bot messages.

mod common;

use common::TestDb;
use compliance_database::repositories::{ConversationRepository, MessageRepository};
use compliance_database::schema::{CHAT_BASELINE, MESSAGE_AGENT_TYPE};
use compliance_entity::conversation::CreateConversation;
use compliance_entity::message::{CreateMessage, MessageRole};

async fn conversation(repo: &ConversationRepository, agent_type: Option<&str>) -> i32 {
    repo.create(&CreateConversation {
        user_id: 1,
        title: None,
        agent_type: agent_type.map(str::to_string),
    })
    .await
    .unwrap()
    .id
}

async fn message(
    repo: &MessageRepository,
    conversation_id: i32,
    role: MessageRole,
    agent_type: Option<&str>,
) -> i32 {
    repo.create(&CreateMessage {
        conversation_id,
        role,
        content: "hello".into(),
        agent_type: agent_type.map(str::to_string),
    })
    .await
    .unwrap()
    .id
}

async fn agent_of(repo: &MessageRepository, id: i32) -> Option<String> {
    repo.find_by_id(id).await.unwrap().unwrap().agent_type
}

#[tokio::test]
async fn bot_messages_inherit_conversation_agent() {
    let db = TestDb::migrated().await;
    let conversations = ConversationRepository::new(db.pool.clone());
    let messages = MessageRepository::new(db.pool.clone());

    let conv = conversation(&conversations, Some("support_bot")).await;
    let bot_a = message(&messages, conv, MessageRole::Bot, None).await;
    let human = message(&messages, conv, MessageRole::User, None).await;
    let bot_b = message(&messages, conv, MessageRole::Bot, None).await;

    assert_eq!(messages.count_backfill_candidates().await.unwrap(), 2);
    assert_eq!(messages.backfill_agent_types().await.unwrap(), 2);

    assert_eq!(agent_of(&messages, bot_a).await.as_deref(), Some("support_bot"));
    assert_eq!(agent_of(&messages, bot_b).await.as_deref(), Some("support_bot"));
    assert_eq!(agent_of(&messages, human).await, None);

    assert_eq!(messages.backfill_agent_types().await.unwrap(), 0);
    assert_eq!(messages.count_missing_agent_type().await.unwrap(), 0);

    db.cleanup().await;
}

#[tokio::test]
async fn populated_rows_and_other_conversations_are_untouched() {
    let db = TestDb::migrated().await;
    let conversations = ConversationRepository::new(db.pool.clone());
    let messages = MessageRepository::new(db.pool.clone());

    let support = conversation(&conversations, Some("support_bot")).await;
    let sales = conversation(&conversations, Some("sales_bot")).await;
    let unassigned = conversation(&conversations, None).await;

    let explicit = message(&messages, support, MessageRole::Bot, Some("triage_bot")).await;
    let sales_bot = message(&messages, sales, MessageRole::Bot, None).await;
    let orphan = message(&messages, unassigned, MessageRole::Bot, None).await;

    assert_eq!(messages.backfill_agent_types().await.unwrap(), 1);

    assert_eq!(agent_of(&messages, explicit).await.as_deref(), Some("triage_bot"));
    assert_eq!(agent_of(&messages, sales_bot).await.as_deref(), Some("sales_bot"));
    assert_eq!(agent_of(&messages, orphan).await, None);

    assert_eq!(messages.count_missing_agent_type().await.unwrap(), 1);
    assert_eq!(messages.backfill_agent_types().await.unwrap(), 0);

    db.cleanup().await;
}

#[tokio::test]
async fn later_agent_change_does_not_rewrite_history() {
    let db = TestDb::migrated().await;
    let conversations = ConversationRepository::new(db.pool.clone());
    let messages = MessageRepository::new(db.pool.clone());

    let conv = conversation(&conversations, Some("support_bot")).await;
    let early = message(&messages, conv, MessageRole::Bot, None).await;
    messages.backfill_agent_types().await.unwrap();

    let updated = conversations
        .set_agent_type(conv, Some("billing_bot"))
        .await
        .unwrap();
    assert_eq!(updated.agent_type.as_deref(), Some("billing_bot"));
    let late = message(&messages, conv, MessageRole::Bot, Some("billing_bot")).await;

    assert_eq!(messages.backfill_agent_types().await.unwrap(), 0);
    assert_eq!(agent_of(&messages, early).await.as_deref(), Some("support_bot"));
    assert_eq!(agent_of(&messages, late).await.as_deref(), Some("billing_bot"));

    let listed = messages.list_for_conversation(conv).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].author().unwrap(), MessageRole::Bot);

    db.cleanup().await;
}

#[tokio::test]
async fn unit_backfills_rows_written_before_the_column_existed() {
    let db = TestDb::empty().await;
    CHAT_BASELINE.apply(&db.pool).await.unwrap();

    let conv: i32 = sqlx::query_scalar(
        "INSERT INTO fastapi_conversations (user_id, agent_type) VALUES (1, 'support_bot') RETURNING id",
    )
    .fetch_one(&db.pool)
    .await
    .unwrap();
    for role in ["bot", "bot", "user"] {
        sqlx::query("INSERT INTO fastapi_messages (conversation_id, role, content) VALUES ($1, $2, 'hi')")
            .bind(conv)
            .bind(role)
            .execute(&db.pool)
            .await
            .unwrap();
    }

    assert_eq!(MESSAGE_AGENT_TYPE.apply(&db.pool).await.unwrap(), 2);
    assert_eq!(MESSAGE_AGENT_TYPE.apply(&db.pool).await.unwrap(), 0);

    let agents: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT role, agent_type FROM fastapi_messages ORDER BY id")
            .fetch_all(&db.pool)
            .await
            .unwrap();
    assert_eq!(
        agents,
        vec![
            ("bot".to_string(), Some("support_bot".to_string())),
            ("bot".to_string(), Some("support_bot".to_string())),
            ("user".to_string(), None),
        ]
    );

    db.cleanup().await;
}

#[tokio::test]
async fn deleting_a_conversation_cascades_to_messages() {
    let db = TestDb::migrated().await;
    let conversations = ConversationRepository::new(db.pool.clone());
    let messages = MessageRepository::new(db.pool.clone());

    let conv = conversation(&conversations, Some("support_bot")).await;
    let id = message(&messages, conv, MessageRole::User, None).await;

    sqlx::query("DELETE FROM fastapi_conversations WHERE id = $1")
        .bind(conv)
        .execute(&db.pool)
        .await
        .unwrap();

    assert!(messages.find_by_id(id).await.unwrap().is_none());
    assert!(conversations.find_by_id(conv).await.unwrap().is_none());

    db.cleanup().await;
}
