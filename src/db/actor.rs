use crate::db::models::{DbDeletionRequest, DbIntegration, DbSyncLog, IntegrationStatus};
use crate::db::patch::{DeletionRequestCreate, IntegrationUpsert, SyncLogCreate};
use crate::db::schema::SQLITE_INIT;
use crate::error::GatewayError;
use crate::providers::ProviderKind;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

const INTEGRATION_COLUMNS: &str = "id, user_id, provider, status, access_token, refresh_token, \
     token_expires_at, account_id, account_name, account_currency, sync_enabled, error_message, \
     error_count, created_at, updated_at";

type Reply<T> = RpcReplyPort<Result<T, GatewayError>>;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert or overwrite the `(user_id, provider)` row and return its id.
    UpsertIntegration(IntegrationUpsert, Reply<i64>),

    GetIntegration(String, ProviderKind, Reply<Option<DbIntegration>>),

    ListIntegrationsForUser(String, Reply<Vec<DbIntegration>>),

    /// Every row of `provider` whose stored `account_id` equals the given id.
    ListByExternalAccount(ProviderKind, String, Reply<Vec<DbIntegration>>),

    AppendSyncLog(SyncLogCreate, Reply<i64>),

    CountSyncLogs(i64, Reply<i64>),

    /// Sync logs of one integration, oldest first.
    ListSyncLogs(i64, Reply<Vec<DbSyncLog>>),

    /// Delete the sync logs of one integration; returns the number of rows removed.
    DeleteSyncLogs(i64, Reply<u64>),

    /// Delete one integration by id; returns the number of rows removed.
    DeleteIntegration(i64, Reply<u64>),

    RecordDeletionRequest(DeletionRequestCreate, Reply<()>),

    GetDeletionRequest(String, Reply<Option<DbDeletionRequest>>),

    /// Mark `(user_id, provider)` disconnected and drop its tokens. `false` when no row matched.
    Disconnect(String, ProviderKind, Reply<bool>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn upsert_integration(&self, upsert: IntegrationUpsert) -> Result<i64, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::UpsertIntegration, upsert).map_err(|e| {
            GatewayError::RactorError(format!("DbActor UpsertIntegration RPC failed: {e}"))
        })?
    }

    pub async fn get_integration(
        &self,
        user_id: &str,
        provider: ProviderKind,
    ) -> Result<Option<DbIntegration>, GatewayError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetIntegration,
            user_id.to_string(),
            provider
        )
        .map_err(|e| GatewayError::RactorError(format!("DbActor GetIntegration RPC failed: {e}")))?
    }

    pub async fn list_integrations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<DbIntegration>, GatewayError> {
        ractor::call!(
            self.actor,
            DbActorMessage::ListIntegrationsForUser,
            user_id.to_string()
        )
        .map_err(|e| {
            GatewayError::RactorError(format!("DbActor ListIntegrationsForUser RPC failed: {e}"))
        })?
    }

    pub async fn list_by_external_account(
        &self,
        provider: ProviderKind,
        account_id: &str,
    ) -> Result<Vec<DbIntegration>, GatewayError> {
        ractor::call!(
            self.actor,
            DbActorMessage::ListByExternalAccount,
            provider,
            account_id.to_string()
        )
        .map_err(|e| {
            GatewayError::RactorError(format!("DbActor ListByExternalAccount RPC failed: {e}"))
        })?
    }

    pub async fn append_sync_log(&self, log: SyncLogCreate) -> Result<i64, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::AppendSyncLog, log).map_err(|e| {
            GatewayError::RactorError(format!("DbActor AppendSyncLog RPC failed: {e}"))
        })?
    }

    pub async fn count_sync_logs(&self, integration_id: i64) -> Result<i64, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::CountSyncLogs, integration_id).map_err(|e| {
            GatewayError::RactorError(format!("DbActor CountSyncLogs RPC failed: {e}"))
        })?
    }

    pub async fn list_sync_logs(&self, integration_id: i64) -> Result<Vec<DbSyncLog>, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::ListSyncLogs, integration_id).map_err(|e| {
            GatewayError::RactorError(format!("DbActor ListSyncLogs RPC failed: {e}"))
        })?
    }

    pub async fn delete_sync_logs(&self, integration_id: i64) -> Result<u64, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::DeleteSyncLogs, integration_id).map_err(|e| {
            GatewayError::RactorError(format!("DbActor DeleteSyncLogs RPC failed: {e}"))
        })?
    }

    pub async fn delete_integration(&self, id: i64) -> Result<u64, GatewayError> {
        ractor::call!(self.actor, DbActorMessage::DeleteIntegration, id).map_err(|e| {
            GatewayError::RactorError(format!("DbActor DeleteIntegration RPC failed: {e}"))
        })?
    }

    pub async fn record_deletion_request(
        &self,
        create: DeletionRequestCreate,
    ) -> Result<(), GatewayError> {
        ractor::call!(self.actor, DbActorMessage::RecordDeletionRequest, create).map_err(|e| {
            GatewayError::RactorError(format!("DbActor RecordDeletionRequest RPC failed: {e}"))
        })?
    }

    pub async fn get_deletion_request(
        &self,
        confirmation_code: &str,
    ) -> Result<Option<DbDeletionRequest>, GatewayError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetDeletionRequest,
            confirmation_code.to_string()
        )
        .map_err(|e| {
            GatewayError::RactorError(format!("DbActor GetDeletionRequest RPC failed: {e}"))
        })?
    }

    pub async fn disconnect(
        &self,
        user_id: &str,
        provider: ProviderKind,
    ) -> Result<bool, GatewayError> {
        ractor::call!(
            self.actor,
            DbActorMessage::Disconnect,
            user_id.to_string(),
            provider
        )
        .map_err(|e| GatewayError::RactorError(format!("DbActor Disconnect RPC failed: {e}")))?
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
            DbActorMessage::UpsertIntegration(upsert, reply) => {
                let _ = reply.send(upsert_integration(pool, upsert).await);
            }
            DbActorMessage::GetIntegration(user_id, provider, reply) => {
                let _ = reply.send(get_integration(pool, &user_id, provider).await);
            }
            DbActorMessage::ListIntegrationsForUser(user_id, reply) => {
                let _ = reply.send(list_integrations_for_user(pool, &user_id).await);
            }
            DbActorMessage::ListByExternalAccount(provider, account_id, reply) => {
                let _ = reply.send(list_by_external_account(pool, provider, &account_id).await);
            }
            DbActorMessage::AppendSyncLog(log, reply) => {
                let _ = reply.send(append_sync_log(pool, log).await);
            }
            DbActorMessage::CountSyncLogs(integration_id, reply) => {
                let res = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM sync_logs WHERE integration_id = ?",
                )
                .bind(integration_id)
                .fetch_one(pool)
                .await
                .map_err(GatewayError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::ListSyncLogs(integration_id, reply) => {
                let res = sqlx::query_as::<_, DbSyncLog>(
                    r#"
                SELECT id, integration_id, status, message, created_at
                FROM sync_logs
                WHERE integration_id = ?
                ORDER BY id
                "#,
                )
                .bind(integration_id)
                .fetch_all(pool)
                .await
                .map_err(GatewayError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteSyncLogs(integration_id, reply) => {
                let res = sqlx::query("DELETE FROM sync_logs WHERE integration_id = ?")
                    .bind(integration_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
                    .map_err(GatewayError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteIntegration(id, reply) => {
                let res = sqlx::query("DELETE FROM integrations WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
                    .map_err(GatewayError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::RecordDeletionRequest(create, reply) => {
                let _ = reply.send(record_deletion_request(pool, create).await);
            }
            DbActorMessage::GetDeletionRequest(code, reply) => {
                let res = sqlx::query_as::<_, DbDeletionRequest>(
                    r#"
                SELECT confirmation_code, provider, external_account_id, deleted_count, failed_count, created_at
                FROM deletion_requests
                WHERE confirmation_code = ?
                "#,
                )
                .bind(code)
                .fetch_optional(pool)
                .await
                .map_err(GatewayError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::Disconnect(user_id, provider, reply) => {
                let _ = reply.send(disconnect(pool, &user_id, provider).await);
            }
        }
        Ok(())
    }
}

async fn upsert_integration(
    pool: &SqlitePool,
    u: IntegrationUpsert,
) -> Result<i64, GatewayError> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO integrations (
        user_id, provider, status, access_token, refresh_token, token_expires_at,
        account_id, account_name, account_currency, sync_enabled, error_message, error_count,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, NULL, 0, ?, ?)
    ON CONFLICT(user_id, provider) DO UPDATE SET
        status = excluded.status,
        access_token = excluded.access_token,
        refresh_token = excluded.refresh_token,
        token_expires_at = excluded.token_expires_at,
        account_id = excluded.account_id,
        account_name = excluded.account_name,
        account_currency = excluded.account_currency,
        sync_enabled = 1,
        error_message = NULL,
        error_count = 0,
        updated_at = excluded.updated_at
    RETURNING id
    "#,
    )
    .bind(u.user_id)
    .bind(u.provider)
    .bind(IntegrationStatus::Connected)
    .bind(u.access_token)
    .bind(u.refresh_token)
    .bind(u.token_expires_at)
    .bind(u.account_id)
    .bind(u.account_name)
    .bind(u.account_currency)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn get_integration(
    pool: &SqlitePool,
    user_id: &str,
    provider: ProviderKind,
) -> Result<Option<DbIntegration>, GatewayError> {
    let row = sqlx::query_as::<_, DbIntegration>(&format!(
        "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE user_id = ? AND provider = ?"
    ))
    .bind(user_id)
    .bind(provider)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn list_integrations_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<DbIntegration>, GatewayError> {
    let rows = sqlx::query_as::<_, DbIntegration>(&format!(
        "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE user_id = ? ORDER BY provider"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn list_by_external_account(
    pool: &SqlitePool,
    provider: ProviderKind,
    account_id: &str,
) -> Result<Vec<DbIntegration>, GatewayError> {
    let rows = sqlx::query_as::<_, DbIntegration>(&format!(
        "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE provider = ? AND account_id = ? ORDER BY id"
    ))
    .bind(provider)
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn append_sync_log(pool: &SqlitePool, log: SyncLogCreate) -> Result<i64, GatewayError> {
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO sync_logs (integration_id, status, message, created_at)
    VALUES (?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(log.integration_id)
    .bind(log.status)
    .bind(log.message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn record_deletion_request(
    pool: &SqlitePool,
    c: DeletionRequestCreate,
) -> Result<(), GatewayError> {
    sqlx::query(
        r#"
    INSERT INTO deletion_requests (
        confirmation_code, provider, external_account_id, deleted_count, failed_count, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?)
    "#,
    )
    .bind(c.confirmation_code)
    .bind(c.provider)
    .bind(c.external_account_id)
    .bind(c.deleted_count)
    .bind(c.failed_count)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

async fn disconnect(
    pool: &SqlitePool,
    user_id: &str,
    provider: ProviderKind,
) -> Result<bool, GatewayError> {
    let res = sqlx::query(
        r#"
    UPDATE integrations
    SET status = ?, access_token = NULL, refresh_token = NULL, token_expires_at = NULL,
        sync_enabled = 0, updated_at = ?
    WHERE user_id = ? AND provider = ?
    "#,
    )
    .bind(IntegrationStatus::Disconnected)
    .bind(Utc::now())
    .bind(user_id)
    .bind(provider)
    .execute(pool)
    .await?;

    Ok(res.rows_affected() > 0)
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is unnamed, so several stores can live in one process.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), GatewayError> {
    sqlx::raw_sql(SQLITE_INIT).execute(pool).await?;
    Ok(())
}
