//! Resource managers shipped with the crate

pub mod memory;

pub use memory::MemoryResourceManager;
