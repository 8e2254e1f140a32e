//! Request parameter normalization shared by the listing endpoints

/// Upper bound for public listing limits.
pub const MAX_LIST_LIMIT: i64 = 50;

/// Clamp an optional `limit` query value into `1..=MAX_LIST_LIMIT`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 1), 1);
        assert_eq!(clamp_limit(None, 12), 12);
        assert_eq!(clamp_limit(Some(0), 12), 1);
        assert_eq!(clamp_limit(Some(-5), 12), 1);
        assert_eq!(clamp_limit(Some(500), 12), MAX_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(7), 12), 7);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Team ")), Some("Team"));
        assert_eq!(non_blank(None), None);
    }
}
