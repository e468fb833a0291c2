//! SQL text handling: file loading, template rendering, schema preparation, parameter binding.

mod file;
pub mod params;
pub mod schema;
pub mod template;

pub use file::*;
pub use params::*;
pub use schema::*;
pub use template::*;
