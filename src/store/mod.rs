// Session persistence
// Storage backends plus the token store that owns the session entry

pub mod backend;
pub mod token_store;

pub use backend::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use token_store::{LoadResult, TokenStore, SESSION_KEY};
