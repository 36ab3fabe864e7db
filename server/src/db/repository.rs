//! Event persistence.
//!
//! An event is one row in `events` plus four child tables keyed by
//! `event_id`. Creation fans the child writes out across four concurrent
//! units inside one transaction; reads fan the child tables back in.

use std::sync::Arc;

use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::config::EventSettings;
use crate::models::{Event, EventDraft, EventRow, EventSummary, EventView};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("event {0} not found")]
    NotFound(i64),

    #[error("error inserting into {table}: {source}")]
    ChildInsert {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("event creation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The four one-to-many collections hanging off an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildTable {
    Languages,
    VideoQualities,
    AudioQualities,
    Invitees,
}

impl ChildTable {
    fn name(self) -> &'static str {
        match self {
            ChildTable::Languages => "event_lang",
            ChildTable::VideoQualities => "event_video_quality",
            ChildTable::AudioQualities => "event_audio_quality",
            ChildTable::Invitees => "event_invitees",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            ChildTable::Languages => "INSERT INTO event_lang (event_id, language) VALUES (?, ?)",
            ChildTable::VideoQualities => {
                "INSERT INTO event_video_quality (event_id, quality) VALUES (?, ?)"
            }
            ChildTable::AudioQualities => {
                "INSERT INTO event_audio_quality (event_id, quality) VALUES (?, ?)"
            }
            ChildTable::Invitees => "INSERT INTO event_invitees (event_id, email) VALUES (?, ?)",
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            ChildTable::Languages => "SELECT language FROM event_lang WHERE event_id = ?",
            ChildTable::VideoQualities => {
                "SELECT quality FROM event_video_quality WHERE event_id = ?"
            }
            ChildTable::AudioQualities => {
                "SELECT quality FROM event_audio_quality WHERE event_id = ?"
            }
            ChildTable::Invitees => "SELECT email FROM event_invitees WHERE event_id = ?",
        }
    }
}

type SharedTx = Mutex<Transaction<'static, Sqlite>>;

#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
    settings: Arc<EventSettings>,
}

impl EventRepository {
    pub fn new(pool: SqlitePool, settings: Arc<EventSettings>) -> Self {
        Self { pool, settings }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store an event and all of its child collections.
    ///
    /// Either everything is committed or nothing is: a failed child insert or
    /// an expired `create_timeout` rolls the whole event back.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create(&self, draft: EventDraft) -> Result<Event, RepoError> {
        match tokio::time::timeout(self.settings.create_timeout, self.create_atomic(draft)).await {
            Ok(result) => result,
            Err(_) => Err(RepoError::Timeout),
        }
    }

    async fn create_atomic(&self, draft: EventDraft) -> Result<Event, RepoError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO events (name, date, description) VALUES (?, ?, ?)")
            .bind(&draft.name)
            .bind(&draft.date)
            .bind(&draft.description)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let tx: SharedTx = Mutex::new(tx);

        // First error wins; the other units are dropped with the join.
        tokio::try_join!(
            insert_children(&tx, ChildTable::Languages, id, &draft.languages),
            insert_children(&tx, ChildTable::VideoQualities, id, &draft.video_qualities),
            insert_children(&tx, ChildTable::AudioQualities, id, &draft.audio_qualities),
            insert_children(&tx, ChildTable::Invitees, id, &draft.invitees),
        )?;

        tx.into_inner().commit().await?;
        debug!(event_id = id, "event committed");

        Ok(draft.into_event(id))
    }

    /// Single-event view, negotiating one video and one audio quality.
    #[instrument(skip(self))]
    pub async fn get_one(
        &self,
        id: i64,
        preferred_video: &str,
        preferred_audio: &str,
    ) -> Result<EventView, RepoError> {
        let row: EventRow =
            sqlx::query_as("SELECT id, name, date, description FROM events WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(RepoError::NotFound(id))?;

        let (languages, video, audio) = tokio::try_join!(
            self.child_values(ChildTable::Languages, id),
            self.child_values(ChildTable::VideoQualities, id),
            self.child_values(ChildTable::AudioQualities, id),
        )?;

        Ok(EventView {
            id: row.id,
            name: row.name,
            date: row.date,
            languages,
            video_quality: select_quality(
                video,
                preferred_video,
                &self.settings.default_video_quality,
            ),
            audio_quality: select_quality(
                audio,
                preferred_audio,
                &self.settings.default_audio_quality,
            ),
            description: row.description,
        })
    }

    /// List view of every stored event with all offered qualities.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<EventSummary>, RepoError> {
        let rows: Vec<EventRow> = sqlx::query_as("SELECT id, name, date, description FROM events")
            .fetch_all(&self.pool)
            .await?;

        let mut all = Vec::with_capacity(rows.len());
        for row in rows {
            let (languages, video_qualities, audio_qualities) = tokio::try_join!(
                self.child_values(ChildTable::Languages, row.id),
                self.child_values(ChildTable::VideoQualities, row.id),
                self.child_values(ChildTable::AudioQualities, row.id),
            )?;

            all.push(EventSummary {
                id: row.id,
                name: row.name,
                date: row.date,
                languages,
                video_qualities,
                audio_qualities,
                description: row.description,
            });
        }

        Ok(all)
    }

    /// Whether `email` is on the guest list of `event_id` (exact match).
    pub async fn is_invited(&self, email: &str, event_id: i64) -> Result<bool, RepoError> {
        let matches: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_invitees WHERE event_id = ? AND email = ?",
        )
        .bind(event_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(matches > 0)
    }

    async fn child_values(&self, table: ChildTable, event_id: i64) -> Result<Vec<String>, RepoError> {
        let values: Vec<String> = sqlx::query_scalar(table.select_sql())
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }
}

async fn insert_children(
    tx: &SharedTx,
    table: ChildTable,
    event_id: i64,
    values: &[String],
) -> Result<(), RepoError> {
    let sql = table.insert_sql();
    for value in values {
        let mut conn = tx.lock().await;
        sqlx::query(sql)
            .bind(event_id)
            .bind(value)
            .execute(&mut **conn)
            .await
            .map_err(|source| RepoError::ChildInsert {
                table: table.name(),
                source,
            })?;
    }
    Ok(())
}

/// First offered quality equal to the preference, otherwise the fallback.
fn select_quality(offered: Vec<String>, preferred: &str, fallback: &str) -> String {
    offered
        .into_iter()
        .find(|quality| quality == preferred)
        .filter(|quality| !quality.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
