//! Row conversion helpers shared by the PostgreSQL adapters.

use crate::domain::foundation::{DomainError, ErrorCode};

pub(super) fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

pub(super) fn invalid_column(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidFormat,
        format!("Invalid {} in database: {}", column, value),
    )
}

/// Converts a domain count or number to an `INTEGER` column value.
pub(super) fn to_i32(column: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| invalid_column(column, value))
}

/// Reads an `INTEGER` column back into a non-negative domain value.
pub(super) fn to_u32(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| invalid_column(column, value))
}

pub(super) fn parse_column<T>(
    column: &str,
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, DomainError> {
    parse(value).ok_or_else(|| invalid_column(column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::CycleStatus;

    #[test]
    fn integer_columns_reject_out_of_range_values() {
        assert_eq!(to_i32("members_limit", 10).unwrap(), 10);
        assert!(to_i32("members_limit", u32::MAX).is_err());
        assert!(to_u32("cycle_number", -1).is_err());
    }

    #[test]
    fn unknown_text_values_are_invalid_format() {
        let err = parse_column("status", "archived", CycleStatus::parse).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(
            parse_column("status", "open", CycleStatus::parse).unwrap(),
            CycleStatus::Open
        );
    }
}
