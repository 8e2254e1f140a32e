//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Prefix of the back-office routes guarded by the admin JWT
pub const ADMIN_PREFIX: &str = "/api/admin";

/// Number of About-section images returned when no limit is given
pub const ABOUT_DEFAULT_LIMIT: i64 = 1;

/// bcrypt work factor for stored admin passwords
pub const PASSWORD_HASH_COST: u32 = 10;
