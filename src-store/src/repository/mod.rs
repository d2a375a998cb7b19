//! Repository Layer
//!
//! Document access abstractions, the SQLite implementation and its live feed.

mod db;
mod item_repo;
mod subscription;
mod traits;


pub use db::{init_db, DbState, MEMORY_DB};
pub use item_repo::ItemRepository;
pub use subscription::Subscription;
pub use traits::{OrderedRepository, Repository};
