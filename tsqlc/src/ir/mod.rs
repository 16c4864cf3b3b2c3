//! Statement trees handed to the compiler.
//!
//! Trees are built by the caller's query builder. Everything here is plain
//! data and can be serialized, see [crate::json].

mod expr;
pub mod fold;
mod statement;

pub use expr::*;
pub use statement::*;
