pub mod attributes_utils;
pub mod byok_utils;
pub mod create_utils;
pub mod error;
pub mod import_utils;
pub mod pkcs12_utils;

pub mod reexport {
    pub use keyvault_client;
}
