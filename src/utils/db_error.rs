//! Helpers for classifying database errors.

/// Name of the uniqueness constraint on `links.code`.
pub const LINK_CODE_CONSTRAINT: &str = "links_code_key";

/// Returns true if `e` is a unique violation of the link code constraint.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(LINK_CODE_CONSTRAINT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_violation() {
        assert!(!is_unique_violation_on_code(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation_on_code(&sqlx::Error::PoolTimedOut));
    }
}
