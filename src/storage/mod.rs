//! Storage mechanisms for persisting and retrieving identities

pub mod memory;
pub mod traits;

// Re-export main components
pub use memory::MemoryUserStore;
pub use traits::UserStore;
