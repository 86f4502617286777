//! Core definitions (error model and argument verification), relied upon by all binview-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
