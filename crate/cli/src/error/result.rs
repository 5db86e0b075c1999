use std::fmt::Display;

use super::KeyVaultCliError;

pub type KeyVaultCliResult<R> = Result<R, KeyVaultCliError>;

/// Trait for providing helper methods for `KeyVaultCliResult`.
pub trait KeyVaultCliResultHelper<T> {
    /// Sets the context for the error.
    ///
    /// # Errors
    ///
    /// Returns a `KeyVaultCliResult` with the specified context.
    fn context(self, context: &str) -> KeyVaultCliResult<T>;

    /// Sets the context for the error using a closure.
    ///
    /// # Errors
    ///
    /// Returns a `KeyVaultCliResult` with the context returned by the closure.
    fn with_context<D, O>(self, op: O) -> KeyVaultCliResult<T>
    where
        D: Display + Send + Sync + 'static,
        O: FnOnce() -> D;
}

impl<T, E> KeyVaultCliResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> KeyVaultCliResult<T> {
        self.map_err(|e| KeyVaultCliError::Default(format!("{context}: {e}")))
    }

    fn with_context<D, O>(self, op: O) -> KeyVaultCliResult<T>
    where
        D: Display + Send + Sync + 'static,
        O: FnOnce() -> D,
    {
        self.map_err(|e| KeyVaultCliError::Default(format!("{}: {e}", op())))
    }
}

impl<T> KeyVaultCliResultHelper<T> for Option<T> {
    fn context(self, context: &str) -> KeyVaultCliResult<T> {
        self.ok_or_else(|| KeyVaultCliError::Default(context.to_owned()))
    }

    fn with_context<D, O>(self, op: O) -> KeyVaultCliResult<T>
    where
        D: Display + Send + Sync + 'static,
        O: FnOnce() -> D,
    {
        self.ok_or_else(|| KeyVaultCliError::Default(format!("{}", op())))
    }
}
