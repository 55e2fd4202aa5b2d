use thiserror::Error;

/// A repository call failed (connection, query or row mapping).
///
/// Callers must surface this instead of treating the lookup as empty; the
/// credit gate in particular never reads a failed lookup as "no debt".
#[derive(Error, Debug)]
#[error("Data access failed: {0}")]
pub struct DataAccessError(#[from] pub anyhow::Error);

impl From<sqlx::Error> for DataAccessError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.into())
    }
}
