/*!
 * Error Types
 *
 * Internal failures of the wait table. None of these cross the public
 * wait/notify entry points: they are logged and converted into a spurious
 * return or a notify with no effect.
 */

use miette::Diagnostic;
use std::collections::TryReserveError;
use thiserror::Error;

/// Wait table errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TableError {
    #[error("Failed to reserve a wait slot: {0}")]
    #[diagnostic(
        code(table::exhausted),
        help("The bucket's waiter arena could not grow. The wait returns immediately.")
    )]
    Exhausted(#[from] TryReserveError),
}

/// Result type for wait table operations
pub type TableResult<T> = Result<T, TableError>;
