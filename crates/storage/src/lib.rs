#![forbid(unsafe_code)]

pub mod gateway;
pub mod progress_store;

pub use gateway::{InMemoryGateway, PersistenceError, PersistenceGateway};
pub use progress_store::{ModifyError, ProgressStore};
