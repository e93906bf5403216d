#![forbid(unsafe_code)]

pub mod pool;
pub mod repository;

pub use repository::{AttemptRepository, InMemoryRepository, QuestionBank, Storage, StorageError};
