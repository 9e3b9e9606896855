use std::{env::VarError, fmt::Display};

use diesel::result::DatabaseErrorKind;

#[derive(Debug)]
pub enum TradelogError {
    InternalError(InternalError),
    /// The database refused a write (foreign key, not null, unique...)
    ConstraintViolation(String),
    NotFound(String),
    /// A record or a row that cannot be interpreted
    InvalidData(String),
}

#[derive(Debug)]
pub enum InternalError {
    DbServiceError(TradelogInternalError),
    ConfigError(TradelogInternalError),
}

#[derive(Debug)]
pub struct TradelogInternalError {
    msg: Box<str>,
}

impl<T: AsRef<str>> From<T> for TradelogInternalError {
    fn from(value: T) -> Self {
        Self {
            msg: value.as_ref().into(),
        }
    }
}

impl TradelogInternalError {
    pub fn message(&self) -> &str {
        &self.msg
    }
}

#[macro_export]
macro_rules! db_error {
    ($msg:expr) => {
        $crate::TradelogError::InternalError($crate::InternalError::DbServiceError(
            $crate::TradelogInternalError::from($msg),
        ))
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::TradelogError::InternalError($crate::InternalError::ConfigError(
            $crate::TradelogInternalError::from($msg),
        ))
    };
}

impl TradelogError {
    pub fn is_internal(&self) -> bool {
        matches!(self, TradelogError::InternalError(_))
    }
}

impl Display for TradelogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            TradelogError::InternalError(_) => {
                write!(f, "Internal Error")
            }
            TradelogError::ConstraintViolation(e) => {
                write!(f, "Constraint Violation: {}", e)
            }
            TradelogError::NotFound(e) => {
                write!(f, "Not Found: {}", e)
            }
            TradelogError::InvalidData(e) => {
                write!(f, "Invalid Data: {}", e)
            }
        }
    }
}

impl std::error::Error for TradelogError {}

// Implementation on Foreign Data Types
impl From<VarError> for TradelogError {
    fn from(value: VarError) -> Self {
        config_error!(format!("std::env::VarError:: {:?}", value))
    }
}

impl From<diesel::ConnectionError> for TradelogError {
    fn from(value: diesel::ConnectionError) -> Self {
        db_error!(format!("diesel::ConnectionError:: {:?}", value))
    }
}

impl From<diesel_async::pooled_connection::deadpool::BuildError> for TradelogError {
    fn from(value: diesel_async::pooled_connection::deadpool::BuildError) -> Self {
        config_error!(format!(
            "diesel_async::pooled_connection::deadpool::BuildError:: {:?}",
            value
        ))
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for TradelogError {
    fn from(value: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        db_error!(format!(
            "diesel_async::pooled_connection::deadpool::PoolError:: {:?}",
            value
        ))
    }
}

impl From<diesel::result::Error> for TradelogError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => TradelogError::NotFound("record not found".into()),
            diesel::result::Error::DatabaseError(
                kind @ (DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::CheckViolation),
                info,
            ) => TradelogError::ConstraintViolation(format!("{:?}: {}", kind, info.message())),
            other => db_error!(format!("diesel::result::Error:: {:?}", other)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn internal_details_are_hidden_from_display() {
        let e = db_error!("connection reset by peer");
        assert!(e.is_internal());
        assert_eq!(e.to_string(), "Internal Error");
        assert!(format!("{:?}", e).contains("connection reset by peer"));
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let e = TradelogError::from(diesel::result::Error::NotFound);
        assert!(matches!(e, TradelogError::NotFound(_)));
        assert!(!e.is_internal());
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let e = TradelogError::from(VarError::NotPresent);
        assert!(matches!(
            e,
            TradelogError::InternalError(InternalError::ConfigError(_))
        ));
    }

    #[test]
    fn other_diesel_errors_are_internal() {
        let e = TradelogError::from(diesel::result::Error::RollbackTransaction);
        match e {
            TradelogError::InternalError(InternalError::DbServiceError(inner)) => {
                assert!(inner.message().starts_with("diesel::result::Error::"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
