// =============================================================================
// Afurada Backend Constants
// =============================================================================
// Limits and defaults used across the backend, kept in one place so they can
// be tuned without hunting through services and handlers.

// =============================================================================
// ANIME LIST
// =============================================================================

/// Maximum number of characters allowed in a list entry's notes
pub const MAX_NOTES_LENGTH: usize = 500;

/// Highest score accepted for any rating category
pub const MAX_RATING_SCORE: u8 = 10;

/// Largest watched-episode count the list store can hold
pub const MAX_EPISODES_WATCHED: u32 = i32::MAX as u32;

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// How many pending recommendations a user can hold before new ones are refused
pub const MAX_RECOMMENDATION_STACK: u64 = 20;

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: u32 = 50;

// =============================================================================
// AUTH
// =============================================================================

/// Lifetime of tokens minted by the dev_user helper
pub const DEV_TOKEN_TTL_HOURS: i64 = 24 * 7;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default database pool size
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
