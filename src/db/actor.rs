use crate::db::models::{DbCredential, DbIndexingStatus};
use crate::db::patch::{AuthorizationGrant, CredentialPatch, IndexingStatusUpsert};
use crate::db::schema::SQLITE_INIT;
use crate::error::SitepushError;
use chrono::{DateTime, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const CREDENTIAL_COLUMNS: &str = "id, client_id, client_secret, access_token, refresh_token, \
     token_expires_at, property_url, auto_submit_on_publish, auto_submit_sitemap, \
     last_sitemap_submit, is_active, created_at, updated_at";

const INDEXING_COLUMNS: &str =
    "id, url, page_type, reference_id, indexing_status, last_checked, created_at, updated_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Fetch the single active credential, if any.
    GetActiveCredential(RpcReplyPort<Result<Option<DbCredential>, SitepushError>>),

    /// List every credential row, active or not.
    ListCredentials(RpcReplyPort<Result<Vec<DbCredential>, SitepushError>>),

    /// Overwrite the existing credential row (or insert the first one) and make it active.
    StoreAuthorization(AuthorizationGrant, RpcReplyPort<Result<i64, SitepushError>>),

    /// Patch a credential by id.
    PatchCredential(i64, CredentialPatch, RpcReplyPort<Result<(), SitepushError>>),

    /// Upsert an indexing status row by url.
    UpsertIndexingStatus(
        IndexingStatusUpsert,
        RpcReplyPort<Result<DbIndexingStatus, SitepushError>>,
    ),

    /// Set `last_checked` on a tracked url. Replies whether a row was touched.
    TouchIndexingStatus(
        String,
        DateTime<Utc>,
        RpcReplyPort<Result<bool, SitepushError>>,
    ),

    GetIndexingStatus(String, RpcReplyPort<Result<Option<DbIndexingStatus>, SitepushError>>),

    ListIndexingStatus(RpcReplyPort<Result<Vec<DbIndexingStatus>, SitepushError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn get_active_credential(&self) -> Result<Option<DbCredential>, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::GetActiveCredential).map_err(|e| {
            SitepushError::RactorError(format!("DbActor GetActiveCredential RPC failed: {e}"))
        })?
    }

    pub async fn list_credentials(&self) -> Result<Vec<DbCredential>, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::ListCredentials).map_err(|e| {
            SitepushError::RactorError(format!("DbActor ListCredentials RPC failed: {e}"))
        })?
    }

    pub async fn store_authorization(&self, grant: AuthorizationGrant) -> Result<i64, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::StoreAuthorization, grant).map_err(|e| {
            SitepushError::RactorError(format!("DbActor StoreAuthorization RPC failed: {e}"))
        })?
    }

    pub async fn patch_credential(
        &self,
        id: i64,
        patch: CredentialPatch,
    ) -> Result<(), SitepushError> {
        ractor::call!(self.actor, DbActorMessage::PatchCredential, id, patch).map_err(|e| {
            SitepushError::RactorError(format!("DbActor PatchCredential RPC failed: {e}"))
        })?
    }

    pub async fn upsert_indexing_status(
        &self,
        upsert: IndexingStatusUpsert,
    ) -> Result<DbIndexingStatus, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::UpsertIndexingStatus, upsert).map_err(|e| {
            SitepushError::RactorError(format!("DbActor UpsertIndexingStatus RPC failed: {e}"))
        })?
    }

    pub async fn touch_indexing_status(
        &self,
        url: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<bool, SitepushError> {
        ractor::call!(
            self.actor,
            DbActorMessage::TouchIndexingStatus,
            url.into(),
            at
        )
        .map_err(|e| {
            SitepushError::RactorError(format!("DbActor TouchIndexingStatus RPC failed: {e}"))
        })?
    }

    pub async fn get_indexing_status(
        &self,
        url: impl Into<String>,
    ) -> Result<Option<DbIndexingStatus>, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::GetIndexingStatus, url.into()).map_err(|e| {
            SitepushError::RactorError(format!("DbActor GetIndexingStatus RPC failed: {e}"))
        })?
    }

    pub async fn list_indexing_status(&self) -> Result<Vec<DbIndexingStatus>, SitepushError> {
        ractor::call!(self.actor, DbActorMessage::ListIndexingStatus).map_err(|e| {
            SitepushError::RactorError(format!("DbActor ListIndexingStatus RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::GetActiveCredential(reply) => {
                let _ = reply.send(get_active_credential(pool).await);
            }
            DbActorMessage::ListCredentials(reply) => {
                let _ = reply.send(list_credentials(pool).await);
            }
            DbActorMessage::StoreAuthorization(grant, reply) => {
                let _ = reply.send(store_authorization(pool, grant).await);
            }
            DbActorMessage::PatchCredential(id, patch, reply) => {
                let _ = reply.send(patch_credential(pool, id, patch).await);
            }
            DbActorMessage::UpsertIndexingStatus(upsert, reply) => {
                let _ = reply.send(upsert_indexing_status(pool, upsert).await);
            }
            DbActorMessage::TouchIndexingStatus(url, at, reply) => {
                let _ = reply.send(touch_indexing_status(pool, &url, at).await);
            }
            DbActorMessage::GetIndexingStatus(url, reply) => {
                let _ = reply.send(get_indexing_status(pool, &url).await);
            }
            DbActorMessage::ListIndexingStatus(reply) => {
                let _ = reply.send(list_indexing_status(pool).await);
            }
        }
        Ok(())
    }
}

async fn get_active_credential(pool: &SqlitePool) -> Result<Option<DbCredential>, SitepushError> {
    let row = sqlx::query_as::<_, DbCredential>(&format!(
        "SELECT {CREDENTIAL_COLUMNS} FROM google_search_console_settings \
         WHERE is_active = 1 ORDER BY id LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn list_credentials(pool: &SqlitePool) -> Result<Vec<DbCredential>, SitepushError> {
    let rows = sqlx::query_as::<_, DbCredential>(&format!(
        "SELECT {CREDENTIAL_COLUMNS} FROM google_search_console_settings ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn store_authorization(
    pool: &SqlitePool,
    grant: AuthorizationGrant,
) -> Result<i64, SitepushError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    // Prefer the active row; otherwise reuse the most recent inactive one.
    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM google_search_console_settings
        ORDER BY is_active DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(&mut *tx)
    .await?;

    let id = match existing {
        Some(id) => {
            // Deactivate first so the single-active index never sees two active rows.
            sqlx::query(
                r#"
                UPDATE google_search_console_settings
                SET is_active = 0, updated_at = ?
                WHERE id != ? AND is_active = 1
                "#,
            )
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE google_search_console_settings
                SET
                    client_id = ?,
                    client_secret = ?,
                    access_token = ?,
                    refresh_token = ?,
                    token_expires_at = ?,
                    is_active = 1,
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(grant.client_id)
            .bind(grant.client_secret)
            .bind(grant.access_token)
            .bind(grant.refresh_token)
            .bind(grant.token_expires_at)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            id
        }
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO google_search_console_settings (
                    client_id, client_secret, access_token, refresh_token, token_expires_at,
                    is_active, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, 1, ?, ?)
                RETURNING id
                "#,
            )
            .bind(grant.client_id)
            .bind(grant.client_secret)
            .bind(grant.access_token)
            .bind(grant.refresh_token)
            .bind(grant.token_expires_at)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;
    debug!(id, updated = existing.is_some(), "credential authorization stored");
    Ok(id)
}

async fn patch_credential(
    pool: &SqlitePool,
    id: i64,
    patch: CredentialPatch,
) -> Result<(), SitepushError> {
    let CredentialPatch {
        access_token,
        refresh_token,
        token_expires_at,
        property_url,
        auto_submit_on_publish,
        auto_submit_sitemap,
        last_sitemap_submit,
    } = patch;

    let access_token_set = access_token.is_some();
    let refresh_token_set = refresh_token.is_some();
    let updated_at = Utc::now();

    let res = sqlx::query(
        r#"
        UPDATE google_search_console_settings
        SET
            access_token = COALESCE(?, access_token),
            refresh_token = COALESCE(?, refresh_token),
            token_expires_at = COALESCE(?, token_expires_at),
            property_url = COALESCE(?, property_url),
            auto_submit_on_publish = COALESCE(?, auto_submit_on_publish),
            auto_submit_sitemap = COALESCE(?, auto_submit_sitemap),
            last_sitemap_submit = COALESCE(?, last_sitemap_submit),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(access_token)
    .bind(refresh_token)
    .bind(token_expires_at)
    .bind(property_url)
    .bind(auto_submit_on_publish)
    .bind(auto_submit_sitemap)
    .bind(last_sitemap_submit)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    let affected = res.rows_affected();
    debug!(
        id,
        affected,
        access_token_set,
        refresh_token_set,
        updated_at = %updated_at,
        "credential patch applied"
    );

    if affected == 0 {
        return Err(SitepushError::UnexpectedError(format!(
            "credential not found for id={id}"
        )));
    }
    Ok(())
}

async fn upsert_indexing_status(
    pool: &SqlitePool,
    upsert: IndexingStatusUpsert,
) -> Result<DbIndexingStatus, SitepushError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, DbIndexingStatus>(&format!(
        r#"
        INSERT INTO seo_indexing_status (
            url, page_type, reference_id, indexing_status, last_checked, created_at, updated_at
        )
        VALUES (?, COALESCE(?, 'page'), ?, ?, ?, ?, ?)
        ON CONFLICT(url) DO UPDATE SET
            page_type = COALESCE(?, page_type),
            reference_id = COALESCE(excluded.reference_id, reference_id),
            indexing_status = CASE
                WHEN excluded.indexing_status = 'PENDING' THEN indexing_status
                ELSE excluded.indexing_status
            END,
            last_checked = COALESCE(excluded.last_checked, last_checked),
            updated_at = excluded.updated_at
        RETURNING {INDEXING_COLUMNS}
        "#
    ))
    .bind(&upsert.url)
    .bind(&upsert.page_type)
    .bind(&upsert.reference_id)
    .bind(upsert.status.as_str())
    .bind(upsert.last_checked)
    .bind(now)
    .bind(now)
    .bind(&upsert.page_type)
    .fetch_one(pool)
    .await?;

    debug!(url = %row.url, status = %row.indexing_status, "indexing status upserted");
    Ok(row)
}

async fn touch_indexing_status(
    pool: &SqlitePool,
    url: &str,
    at: DateTime<Utc>,
) -> Result<bool, SitepushError> {
    let res = sqlx::query(
        r#"
        UPDATE seo_indexing_status
        SET last_checked = ?, updated_at = ?
        WHERE url = ?
        "#,
    )
    .bind(at)
    .bind(Utc::now())
    .bind(url)
    .execute(pool)
    .await?;

    Ok(res.rows_affected() > 0)
}

async fn get_indexing_status(
    pool: &SqlitePool,
    url: &str,
) -> Result<Option<DbIndexingStatus>, SitepushError> {
    let row = sqlx::query_as::<_, DbIndexingStatus>(&format!(
        "SELECT {INDEXING_COLUMNS} FROM seo_indexing_status WHERE url = ?"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn list_indexing_status(pool: &SqlitePool) -> Result<Vec<DbIndexingStatus>, SitepushError> {
    let rows = sqlx::query_as::<_, DbIndexingStatus>(&format!(
        "SELECT {INDEXING_COLUMNS} FROM seo_indexing_status ORDER BY updated_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is unnamed so several stores can coexist in one process (tests do this).
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), SitepushError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
