pub mod console;
pub mod keys;
