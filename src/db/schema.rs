//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `google_search_console_settings`: the OAuth credential plus Search Console flags.
///   A partial unique index allows at most one row with `is_active = 1`.
/// - `seo_indexing_status`: one row per tracked URL.
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Google Search Console credential (single active row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS google_search_console_settings (
    id INTEGER PRIMARY KEY NOT NULL,
    client_id TEXT NOT NULL,
    client_secret TEXT NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    token_expires_at TEXT NOT NULL, -- RFC3339
    property_url TEXT NULL,
    auto_submit_on_publish INTEGER NOT NULL DEFAULT 0,
    auto_submit_sitemap INTEGER NOT NULL DEFAULT 0,
    last_sitemap_submit TEXT NULL, -- RFC3339
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_gsc_settings_single_active
    ON google_search_console_settings(is_active) WHERE is_active = 1;

-- ---------------------------------------------------------------------------
-- Per-URL indexing status
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS seo_indexing_status (
    id INTEGER PRIMARY KEY NOT NULL,
    url TEXT NOT NULL UNIQUE,
    page_type TEXT NOT NULL,
    reference_id TEXT NULL,
    indexing_status TEXT NOT NULL DEFAULT 'PENDING',
    last_checked TEXT NULL, -- RFC3339
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_seo_indexing_status_status ON seo_indexing_status(indexing_status);
"#;
