// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Leads";

/// Crate name used as the default tracing target
pub const CRATE_TARGET: &str = "leads_server";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".leads";

/// Service name reported by the root health route
pub const SERVICE_NAME: &str = "Leads API";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "leads.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LEADS_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LEADS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LEADS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LEADS_LOG";

/// Environment variable for the browser origin allowed by CORS
pub const ENV_FRONTEND_ORIGIN: &str = "LEADS_FRONTEND_ORIGIN";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default frontend origin (Vite dev server)
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Origins always allowed in addition to the configured frontend origin
pub const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "LEADS_DATA_DIR";

/// Environment variable for an explicit SQLite database path
pub const ENV_DATABASE_PATH: &str = "LEADS_DATABASE_PATH";

// =============================================================================
// Authentication
// =============================================================================

/// Cookie name for session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Default session TTL in days
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 7;

/// Environment variable for session TTL
pub const ENV_SESSION_TTL_DAYS: &str = "LEADS_SESSION_TTL_DAYS";

/// Environment variable enabling `Secure` + `SameSite=None` cookies
pub const ENV_SECURE_COOKIE: &str = "LEADS_SECURE_COOKIE";

/// Environment variable for the JWT signing secret
pub const ENV_JWT_SECRET: &str = "LEADS_JWT_SECRET";

/// File (inside the data directory) holding the generated signing key
pub const JWT_KEY_FILENAME: &str = "jwt_signing_key";

/// PBKDF2-HMAC-SHA256 iteration count for new password hashes
pub const PASSWORD_HASH_ROUNDS: u32 = 100_000;

/// Salt length in bytes for password hashes
pub const PASSWORD_SALT_LEN: usize = 16;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "leads.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Pagination
// =============================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for auth endpoints (64 KB)
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Seeding
// =============================================================================

pub const SEED_DEFAULT_EMAIL: &str = "test@example.com";
pub const SEED_DEFAULT_PASSWORD: &str = "Test@1234";
pub const SEED_DEFAULT_COUNT: u32 = 150;

// =============================================================================
// Shutdown
// =============================================================================

/// Max time to wait for background tasks on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
