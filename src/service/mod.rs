//! ExecutionService: render a route's template, bind request parameters, run it on the store.

mod execute;
pub use execute::{Execution, ExecutionService, Prepared};
