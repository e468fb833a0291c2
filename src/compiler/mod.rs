//! Path-to-route compiler: SQL file tree -> route table.

pub mod derive;
pub mod loader;
pub mod types;

pub use derive::*;
pub use loader::*;
pub use types::*;
