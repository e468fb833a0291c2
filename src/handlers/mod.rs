//! HTTP handlers: compiled SQL routes and the built-in system endpoints.

pub mod route;
pub mod system;
pub use route::*;
pub use system::*;
