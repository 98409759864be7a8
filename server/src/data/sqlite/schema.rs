//! SQLite schema definitions
//!
//! Timestamps are integer milliseconds since the Unix epoch (UTC).

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    password_hash TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Leads (references users)
-- =============================================================================
CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1),
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    company TEXT,
    city TEXT,
    state TEXT,
    source TEXT NOT NULL CHECK(source IN ('website', 'facebook_ads', 'google_ads', 'referral', 'events', 'other')),
    status TEXT NOT NULL CHECK(status IN ('new', 'contacted', 'qualified', 'lost', 'won')),
    score INTEGER NOT NULL DEFAULT 0 CHECK(score >= 0 AND score <= 100),
    lead_value REAL NOT NULL DEFAULT 0 CHECK(lead_value >= 0),
    last_activity_at INTEGER,
    is_qualified INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_leads_owner_created ON leads(owner, created_at);
"#;
