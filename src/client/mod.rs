//! Remote client: discovers a running server's routes and exposes them as
//! `namespace.operation` calls.

pub mod namespace;
pub mod remote;
pub use namespace::*;
pub use remote::*;
