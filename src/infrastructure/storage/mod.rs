//! Repository implementations backed by process memory

mod memory;

#[cfg(test)]
pub(crate) mod fixtures;

pub use memory::InMemoryRepositoryProvider;
