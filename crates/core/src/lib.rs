pub mod error;
pub mod favorites;
pub mod format;
pub mod pagination;
pub mod types;
