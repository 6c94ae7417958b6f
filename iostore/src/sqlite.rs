use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use iochat::{
    ChatError, ChatFuture, ChatStore, Conversation, ConversationParticipant, NewAiConfig,
    NewMessage, StoredMessage,
};
use ioprovider::{AiConfig, Model, Provider, User};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::error::StoreError;

const CONFIG_SELECT: &str = "
    SELECT
        c.id, c.name, c.system_prompt, c.created_at, c.updated_at, c.last_used_at,
        m.id, m.name, m.description, m.created_at,
        p.id, p.name, p.created_at, p.updated_at
    FROM ai_configs c
    JOIN models m ON m.id = c.model_id
    JOIN providers p ON p.id = m.provider_id
";

const MODEL_SELECT: &str = "
    SELECT
        m.id, m.name, m.description, m.created_at,
        p.id, p.name, p.created_at, p.updated_at
    FROM models m
    JOIN providers p ON p.id = m.provider_id
";

/// `ChatStore` over a single SQLite connection.
///
/// Ids are stored as hyphenated UUID text and timestamps as fixed-width RFC 3339
/// UTC text, so ordering by a timestamp column is chronological.
#[derive(Debug)]
pub struct SqliteChatStore {
    connection: Mutex<Connection>,
}

impl SqliteChatStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                StoreError::storage(format!("failed to create sqlite parent directory: {error}"))
            })?;
        }

        let connection = Connection::open(path)
            .map_err(storage("failed to open sqlite database"))?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()
            .map_err(storage("failed to open in-memory sqlite database"))?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(storage("failed to configure sqlite busy timeout"))?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS providers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS models (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES providers(id),
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                UNIQUE (provider_id, name)
            );

            CREATE TABLE IF NOT EXISTS ai_configs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                model_id TEXT NOT NULL REFERENCES models(id),
                system_prompt TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_used_at TEXT
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_used_at TEXT
            );

            CREATE TABLE IF NOT EXISTS conversation_participants (
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                user_id TEXT NOT NULL REFERENCES users(id),
                joined_at TEXT NOT NULL,
                PRIMARY KEY (conversation_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                user_id TEXT REFERENCES users(id),
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system', 'developer')),
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_conversation_created
            ON messages(conversation_id, created_at);
            ",
        )
        .map_err(storage("failed to initialize sqlite schema"))?;

        Ok(())
    }

    fn select_configs(
        conn: &Connection,
        filter: Option<Uuid>,
    ) -> Result<Vec<AiConfig>, StoreError> {
        let rows = match filter {
            Some(id) => {
                let mut stmt = conn
                    .prepare(&format!("{CONFIG_SELECT} WHERE c.id = ?1"))
                    .map_err(storage("failed to prepare config query"))?;
                stmt.query_map(params![id.to_string()], config_from_row)
                    .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                    .map_err(corrupt("failed to read config row"))?
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!("{CONFIG_SELECT} ORDER BY c.created_at, c.rowid"))
                    .map_err(storage("failed to prepare config query"))?;
                stmt.query_map([], config_from_row)
                    .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                    .map_err(corrupt("failed to read config row"))?
            }
        };
        Ok(rows)
    }

    fn select_provider(conn: &Connection, name: &str) -> Result<Option<Provider>, StoreError> {
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM providers WHERE name = ?1",
            params![name],
            |row| provider_from_row(row, 0),
        )
        .optional()
        .map_err(corrupt("failed to read provider row"))
    }

    fn select_model(
        conn: &Connection,
        provider_id: Uuid,
        name: &str,
    ) -> Result<Option<Model>, StoreError> {
        conn.query_row(
            &format!("{MODEL_SELECT} WHERE m.provider_id = ?1 AND m.name = ?2"),
            params![provider_id.to_string(), name],
            |row| model_from_row(row, 0),
        )
        .optional()
        .map_err(corrupt("failed to read model row"))
    }

    fn select_user(conn: &Connection, name: &str) -> Result<Option<User>, StoreError> {
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
            params![name],
            |row| user_from_row(row, 0),
        )
        .optional()
        .map_err(corrupt("failed to read user row"))
    }

    fn select_user_by_id(conn: &Connection, id: Uuid) -> Result<Option<User>, StoreError> {
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
            params![id.to_string()],
            |row| user_from_row(row, 0),
        )
        .optional()
        .map_err(corrupt("failed to read user row"))
    }
}

impl ChatStore for SqliteChatStore {
    fn list_ai_configs<'a>(&'a self) -> ChatFuture<'a, Result<Vec<AiConfig>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::select_configs(&conn, None)?)
        })
    }

    fn get_ai_config<'a>(
        &'a self,
        id: Uuid,
    ) -> ChatFuture<'a, Result<Option<AiConfig>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::select_configs(&conn, Some(id))?.into_iter().next())
        })
    }

    fn create_ai_config<'a>(
        &'a self,
        config: NewAiConfig,
    ) -> ChatFuture<'a, Result<AiConfig, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let id = Uuid::new_v4();
            let now = encode_timestamp(Utc::now());
            conn.execute(
                "
                INSERT INTO ai_configs (id, name, model_id, system_prompt, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ",
                params![
                    id.to_string(),
                    &config.name,
                    config.model_id.to_string(),
                    config.system_prompt.as_deref(),
                    now,
                ],
            )
            .map_err(storage("failed to insert ai config"))?;

            Self::select_configs(&conn, Some(id))?
                .into_iter()
                .next()
                .ok_or_else(|| ChatError::from(StoreError::not_found(format!("ai config {id} vanished"))))
        })
    }

    fn get_provider<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Provider>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::select_provider(&conn, name)?)
        })
    }

    fn create_provider<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Provider, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let now = Utc::now();
            let provider = Provider {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            };
            conn.execute(
                "INSERT INTO providers (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![provider.id.to_string(), name, encode_timestamp(now)],
            )
            .map_err(storage("failed to insert provider"))?;
            Ok(provider)
        })
    }

    fn get_model<'a>(
        &'a self,
        provider_id: Uuid,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Model>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::select_model(&conn, provider_id, name)?)
        })
    }

    fn create_model<'a>(
        &'a self,
        provider: &'a Provider,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Model, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let model = Model {
                id: Uuid::new_v4(),
                provider: provider.clone(),
                name: name.to_string(),
                description: None,
                created_at: Utc::now(),
            };
            conn.execute(
                "INSERT INTO models (id, provider_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    model.id.to_string(),
                    provider.id.to_string(),
                    name,
                    encode_timestamp(model.created_at),
                ],
            )
            .map_err(storage("failed to insert model"))?;
            Ok(model)
        })
    }

    fn get_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<Option<User>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::select_user(&conn, name)?)
        })
    }

    fn create_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<User, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT OR IGNORE INTO users (id, name, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
                ",
                params![Uuid::new_v4().to_string(), name, encode_timestamp(Utc::now())],
            )
            .map_err(storage("failed to insert user"))?;

            Self::select_user(&conn, name)?
                .ok_or_else(|| ChatError::from(StoreError::not_found(format!("user {name} vanished"))))
        })
    }

    fn create_conversation<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Conversation, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let now = Utc::now();
            let conversation = Conversation {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
                last_used_at: None,
                participants: Vec::new(),
            };
            conn.execute(
                "INSERT INTO conversations (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![conversation.id.to_string(), name, encode_timestamp(now)],
            )
            .map_err(storage("failed to insert conversation"))?;
            Ok(conversation)
        })
    }

    fn touch_conversation<'a>(
        &'a self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let updated = conn
                .execute(
                    "UPDATE conversations SET last_used_at = ?2, updated_at = ?2 WHERE id = ?1",
                    params![id.to_string(), encode_timestamp(at)],
                )
                .map_err(storage("failed to update conversation"))?;
            if updated == 0 {
                return Err(ChatError::from(StoreError::not_found(format!(
                    "conversation {id} not found"
                ))));
            }
            Ok(())
        })
    }

    fn add_participant<'a>(
        &'a self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ChatFuture<'a, Result<ConversationParticipant, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, joined_at)
                VALUES (?1, ?2, ?3)
                ",
                params![
                    conversation_id.to_string(),
                    user_id.to_string(),
                    encode_timestamp(Utc::now()),
                ],
            )
            .map_err(storage("failed to insert participant"))?;

            let participant = conn
                .query_row(
                    "
                    SELECT conversation_id, user_id, joined_at
                    FROM conversation_participants
                    WHERE conversation_id = ?1 AND user_id = ?2
                    ",
                    params![conversation_id.to_string(), user_id.to_string()],
                    participant_from_row,
                )
                .map_err(corrupt("failed to read participant row"))?;
            Ok(participant)
        })
    }

    fn list_participants<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<ConversationParticipant>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT conversation_id, user_id, joined_at
                    FROM conversation_participants
                    WHERE conversation_id = ?1
                    ORDER BY joined_at, rowid
                    ",
                )
                .map_err(storage("failed to prepare participant query"))?;
            let participants = stmt
                .query_map(params![conversation_id.to_string()], participant_from_row)
                .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                .map_err(corrupt("failed to read participant row"))?;
            Ok(participants)
        })
    }

    fn list_messages<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT
                        m.id, m.conversation_id, m.role, m.content, m.created_at,
                        u.id, u.name, u.created_at, u.updated_at
                    FROM messages m
                    LEFT JOIN users u ON u.id = m.user_id
                    WHERE m.conversation_id = ?1
                    ORDER BY m.created_at, m.rowid
                    ",
                )
                .map_err(storage("failed to prepare message query"))?;
            let messages = stmt
                .query_map(params![conversation_id.to_string()], message_from_row)
                .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                .map_err(corrupt("failed to read message row"))?;
            Ok(messages)
        })
    }

    fn create_message<'a>(
        &'a self,
        message: NewMessage,
    ) -> ChatFuture<'a, Result<StoredMessage, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let user = match message.user_id {
                Some(user_id) => Some(Self::select_user_by_id(&conn, user_id)?.ok_or_else(
                    || StoreError::not_found(format!("user {user_id} not found")),
                )?),
                None => None,
            };

            let stored = StoredMessage {
                id: Uuid::new_v4(),
                conversation_id: message.conversation_id,
                user,
                role: message.role.as_str().to_string(),
                content: message.content,
                created_at: Utc::now(),
            };
            conn.execute(
                "
                INSERT INTO messages (id, conversation_id, user_id, role, content, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    stored.id.to_string(),
                    stored.conversation_id.to_string(),
                    message.user_id.map(|id| id.to_string()),
                    &stored.role,
                    &stored.content,
                    encode_timestamp(stored.created_at),
                ],
            )
            .map_err(storage("failed to insert message"))?;
            Ok(stored)
        })
    }
}

fn storage(context: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |error| StoreError::storage(format!("{context}: {error}"))
}

fn corrupt(context: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |error| match error {
        rusqlite::Error::FromSqlConversionFailure(..) => {
            StoreError::corrupt(format!("{context}: {error}"))
        }
        other => StoreError::storage(format!("{context}: {other}")),
    }
}

fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn uuid_column(row: &Row<'_>, index: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(index)?;
    Uuid::parse_str(&raw)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

fn timestamp_column(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    parse_timestamp(&raw, index)
}

fn optional_timestamp_column(
    row: &Row<'_>,
    index: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(index)?;
    raw.map(|raw| parse_timestamp(&raw, index)).transpose()
}

fn parse_timestamp(raw: &str, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

fn provider_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Provider> {
    Ok(Provider {
        id: uuid_column(row, offset)?,
        name: row.get(offset + 1)?,
        created_at: timestamp_column(row, offset + 2)?,
        updated_at: timestamp_column(row, offset + 3)?,
    })
}

/// Reads model columns at `offset` followed by the joined provider columns.
fn model_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Model> {
    Ok(Model {
        id: uuid_column(row, offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        created_at: timestamp_column(row, offset + 3)?,
        provider: provider_from_row(row, offset + 4)?,
    })
}

fn config_from_row(row: &Row<'_>) -> rusqlite::Result<AiConfig> {
    let system_prompt: Option<String> = row.get(2)?;
    Ok(AiConfig {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        system_prompt: system_prompt.unwrap_or_default(),
        created_at: timestamp_column(row, 3)?,
        updated_at: timestamp_column(row, 4)?,
        last_used_at: optional_timestamp_column(row, 5)?,
        model: model_from_row(row, 6)?,
    })
}

fn user_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_column(row, offset)?,
        name: row.get(offset + 1)?,
        created_at: timestamp_column(row, offset + 2)?,
        updated_at: timestamp_column(row, offset + 3)?,
    })
}

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<ConversationParticipant> {
    Ok(ConversationParticipant {
        conversation_id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        joined_at: timestamp_column(row, 2)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let user_id: Option<String> = row.get(5)?;
    let user = match user_id {
        Some(_) => Some(user_from_row(row, 5)?),
        None => None,
    };

    Ok(StoredMessage {
        id: uuid_column(row, 0)?,
        conversation_id: uuid_column(row, 1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        user,
    })
}

pub(crate) fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("IO_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".io").join("io.sqlite3");
    }

    PathBuf::from("io.sqlite3")
}
