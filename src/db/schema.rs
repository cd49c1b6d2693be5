//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `integrations` table (one (user_id, provider) per row)
/// - `sync_logs` table (rows owned by an integration, written by the sync job)
/// - `deletion_requests` table (receipts issued for provider deletion callbacks)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Connected ad platform accounts (one (user_id, provider) per row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS integrations (
    id INTEGER PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    provider TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'connected',
    access_token TEXT NULL,
    refresh_token TEXT NULL,
    token_expires_at TEXT NULL, -- RFC3339
    account_id TEXT NOT NULL DEFAULT 'unknown',
    account_name TEXT NOT NULL,
    account_currency TEXT NULL,
    sync_enabled INTEGER NOT NULL DEFAULT 1,
    error_message TEXT NULL,
    error_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(user_id, provider)
);

CREATE INDEX IF NOT EXISTS idx_integrations_account ON integrations(provider, account_id);

-- ---------------------------------------------------------------------------
-- Sync job history (no FK cascade, children are deleted explicitly)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sync_logs (
    id INTEGER PRIMARY KEY NOT NULL,
    integration_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    message TEXT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_sync_logs_integration ON sync_logs(integration_id);

-- ---------------------------------------------------------------------------
-- Deletion callback receipts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS deletion_requests (
    confirmation_code TEXT PRIMARY KEY NOT NULL,
    provider TEXT NOT NULL,
    external_account_id TEXT NOT NULL,
    deleted_count INTEGER NOT NULL,
    failed_count INTEGER NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);
"#;
