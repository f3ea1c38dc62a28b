//! Adapters implementing domain ports.
//!
//! Adapters depend on the ports module, never the other way around.

pub mod in_memory_repository;
pub mod msgpack_repository;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
