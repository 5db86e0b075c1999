use keyvault_client::ClientError;
use thiserror::Error;

pub type UtilsResult<R> = Result<R, UtilsError>;

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error(transparent)]
    ClientError(#[from] ClientError),

    #[error("Key file decryption failed: {0}")]
    Decryption(String),

    #[error("Key file not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported key file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),
}

