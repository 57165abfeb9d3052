pub mod close_version;
pub mod create_batch;
pub mod create_versioned;
pub mod entity_repositories;
pub mod find_as_of;
pub mod find_current;
pub mod find_current_batch;
pub mod finders;
pub mod load_batch;
pub mod load_history;
pub mod pagination;
pub mod save_version;

// Re-exports
pub use close_version::*;
pub use create_batch::*;
pub use create_versioned::*;
pub use entity_repositories::*;
pub use find_as_of::*;
pub use find_current::*;
pub use find_current_batch::*;
pub use finders::*;
pub use load_batch::*;
pub use load_history::*;
pub use pagination::*;
pub use save_version::*;
