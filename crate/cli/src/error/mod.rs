use keyvault_client::ClientError;
use keyvault_client_utils::error::UtilsError;
use strum::Display;
use thiserror::Error;

pub mod result;

/// The category reported next to every error message printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCategory {
    Validation,
    FileNotFound,
    UnsupportedFormat,
    Decryption,
    RemoteService,
    Configuration,
    Internal,
}

#[derive(Error, Debug)]
pub enum KeyVaultCliError {
    #[error(transparent)]
    ClientError(#[from] ClientError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Default(String),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error(transparent)]
    UrlParsing(#[from] url::ParseError),

    #[error(transparent)]
    UtilsError(#[from] UtilsError),
}

impl KeyVaultCliError {
    /// The category of the error, as printed by `kvcli`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ClientError(e) => client_category(e),
            Self::Configuration(_) | Self::UrlParsing(_) => ErrorCategory::Configuration,
            Self::UtilsError(e) => match e {
                UtilsError::Validation(_) => ErrorCategory::Validation,
                UtilsError::FileNotFound(_) => ErrorCategory::FileNotFound,
                UtilsError::UnsupportedFormat(_) => ErrorCategory::UnsupportedFormat,
                UtilsError::Decryption(_) => ErrorCategory::Decryption,
                UtilsError::ClientError(e) => client_category(e),
            },
            Self::Default(_) | Self::SerdeJsonError(_) => ErrorCategory::Internal,
        }
    }
}

fn client_category(e: &ClientError) -> ErrorCategory {
    match e {
        ClientError::Configuration(_) | ClientError::UrlError(_) => ErrorCategory::Configuration,
        _ => ErrorCategory::RemoteService,
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! cli_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::cli_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::cli_error!($fmt, $($arg)*));
        }
    };
}

/// Construct a CLI error from a string.
#[macro_export]
macro_rules! cli_error {
    ($msg:literal) => {
        $crate::error::KeyVaultCliError::Default(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::error::KeyVaultCliError::Default($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::KeyVaultCliError::Default(::core::format_args!($fmt, $($arg)*).to_string())
    };
}
