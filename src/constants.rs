// Token lifetime defaults (seconds)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 3600;
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 0;
// Upper bound for any configured lifetime or skew (ten years)
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

// Credential policy defaults
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 4;
pub const MAX_USERNAME_LENGTH: usize = 64;
pub const MIN_SIGNING_KEY_LENGTH: usize = 32;

// Minimum wall time of a login attempt (milliseconds)
pub const DEFAULT_MIN_AUTH_DURATION_MS: u64 = 100;

// Wire format
pub const TOKEN_SEGMENT_SEPARATOR: char = '.';
pub const MAX_TOKEN_LENGTH: usize = 4096;
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
