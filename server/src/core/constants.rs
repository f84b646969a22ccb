// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "TreasureMap";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".treasuremap";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "treasuremap.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TREASUREMAP_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for development mode (enables the debug view)
pub const ENV_DEV: &str = "TREASUREMAP_DEV";

/// Environment variable for server host
pub const ENV_HOST: &str = "TREASUREMAP_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TREASUREMAP_PORT";

/// Platform-provided port, used when `TREASUREMAP_PORT` is unset
pub const ENV_PORT_FALLBACK: &str = "PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TREASUREMAP_LOG";

/// Default log filter when neither `TREASUREMAP_LOG` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info,treasuremap_server=info";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Maximum accepted form body size
pub const MAX_FORM_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// Environment Variables - Gemini
// =============================================================================

/// Full generateContent endpoint URL
pub const ENV_GEMINI_API_URL: &str = "GEMINI_API_URL";

/// API key sent as `X-Goog-Api-Key`
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Path to a service-account JSON file for OAuth
pub const ENV_SERVICE_ACCOUNT_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_FILE";

/// Standard Google credentials path, used when `GOOGLE_SERVICE_ACCOUNT_FILE` is unset
pub const ENV_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Prefer the API key over OAuth (`1`/`true`/`yes` or `0`/`false`/`no`)
pub const ENV_USE_API_KEY: &str = "USE_GOOGLE_API_KEY";

/// Upstream request timeout in seconds
pub const ENV_GEMINI_TIMEOUT: &str = "GEMINI_TIMEOUT_SECS";

// =============================================================================
// Gemini Defaults
// =============================================================================

/// Request timeout for plan generation
pub const GEMINI_TIMEOUT_SECS: u64 = 60;

/// Request timeout for the `check-key` diagnostic
pub const CHECK_KEY_TIMEOUT_SECS: u64 = 30;

/// Endpoint used by `check-key` when no URL is configured
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Prompt used by `check-key`
pub const CHECK_KEY_PROMPT: &str = "Return the single word: OK";

/// OAuth scope for service-account tokens
pub const GEMINI_OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// API key header name
pub const GEMINI_API_KEY_HEADER: &str = "x-goog-api-key";

/// URL fragments that mark an unconfigured placeholder endpoint
pub const PLACEHOLDER_URL_MARKERS: &[&str] = &["example", "your-gemini-endpoint"];

// =============================================================================
// Environment Variables - Layout
// =============================================================================

/// Maximum number of columns in the visit roadmap
pub const ENV_MAX_COLS: &str = "TREASUREMAP_MAX_COLS";

// =============================================================================
// Sessions
// =============================================================================

/// Secret used to sign flash cookies
pub const ENV_SECRET_KEY: &str = "TREASUREMAP_SECRET_KEY";

/// Legacy secret variable, used when `TREASUREMAP_SECRET_KEY` is unset
pub const ENV_SECRET_KEY_FALLBACK: &str = "FLASK_SECRET_KEY";

/// Development-only signing secret
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key";

/// Flash message cookie name
pub const FLASH_COOKIE_NAME: &str = "treasuremap_flash";

/// Flash cookie lifetime in seconds
pub const FLASH_COOKIE_MAX_AGE_SECS: i64 = 60;

// =============================================================================
// User-facing messages
// =============================================================================

pub const MSG_MISSING_DESTINATION: &str = "Please provide a destination.";
