//! # tsqlc
//!
//! Compiler from a relational query tree to SQL Server (T-SQL) text.
//!
//! SQL Server has no `LIMIT` / `OFFSET` in the dialects this crate targets,
//! and refuses to order a `SELECT DISTINCT` by anything outside its select
//! list. The compiler classifies each query and rewrites it around those
//! restrictions:
//!
//! ```ascii
//!                  Statement
//!                      │
//!            ┌─────────┴─────────┐
//!            ▼                   ▼
//!          SELECT              UPDATE
//!            │                   │ (limit guard)
//!       (classify)               │ (key restriction)
//!            │                   ▼
//!   ┌────────┼──────────┬─────────────┐
//!   ▼        ▼          ▼             ▼
//! Plain  Paginated  ComplexCount  DistinctForeignOrder
//!   │        │          │             │
//!   └────────┴────┬─────┴─────────────┘
//!                 ▼
//!                SQL
//! ```
//!
//! ## Example
//!
//! ```
//! use tsqlc::ir::{Expr, SelectCore, SelectStatement, Source};
//!
//! let core = SelectCore::new(vec![Expr::all_of("people")], Source::table("people"));
//! let query = SelectStatement::new(core)
//!     .with_orders(vec![Expr::qualified("people", "name").asc()])
//!     .with_limit(10);
//!
//! let sql = tsqlc::compile(&query.into(), &tsqlc::Options::default()).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT TOP (10) [people].* FROM [people] ORDER BY [people].[name] ASC"
//! );
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::result_large_err)]

use serde::{Deserialize, Serialize};

pub use error::{Error, Reason, WithErrorInfo};
pub use ir::reverse_orders;
pub use sql::{columns_for_distinct, quote_identifier, quote_literal};

mod error;
pub mod ir;
mod sql;
mod utils;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Row count standing in for "no limit" where a limit must be rendered.
///
/// SQL Server rejects `ORDER BY` in subqueries unless `TOP` is present, so
/// ordered statements without a limit get this one.
pub const UNBOUNDED_LIMIT: i64 = i64::MAX;

/// Compile a statement into SQL text.
///
/// The input is not modified; all rewrites happen on a copy.
pub fn compile(statement: &ir::Statement, options: &Options) -> Result<String> {
    let sql = sql::compile(statement, options)?;

    Ok(if options.format {
        sqlformat::format(
            &sql,
            &sqlformat::QueryParams::None,
            &sqlformat::FormatOptions::default(),
        )
    } else {
        sql
    })
}

/// Compilation options for SQL backend of the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Pass generated SQL string trough a formatter that splits it
    /// into multiple lines and prettifies indentation and spacing.
    ///
    /// Defaults to false.
    pub format: bool,

    /// Collation applied to case-sensitive comparison operands.
    ///
    /// Defaults to `Latin1_General_CS_AS_WS`.
    pub collation: String,

    /// Table hint rendered for [ir::Lock::Default].
    pub lock_hint: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: false,
            collation: "Latin1_General_CS_AS_WS".to_string(),
            lock_hint: "WITH(HOLDLOCK, ROWLOCK)".to_string(),
        }
    }
}

impl Options {
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn no_format(self) -> Self {
        self.with_format(false)
    }

    pub fn with_collation<S: ToString>(mut self, collation: S) -> Self {
        self.collation = collation.to_string();
        self
    }

    pub fn with_lock_hint<S: ToString>(mut self, lock_hint: S) -> Self {
        self.lock_hint = lock_hint.to_string();
        self
    }
}

pub mod json {
    use super::*;

    /// JSON serialization
    pub fn from_statement(statement: &ir::Statement) -> Result<String> {
        serde_json::to_string(statement).map_err(convert_json_err)
    }

    /// JSON deserialization
    pub fn to_statement(json: &str) -> Result<ir::Statement> {
        serde_json::from_str(json).map_err(convert_json_err)
    }

    fn convert_json_err(err: serde_json::Error) -> Error {
        Error::new_simple(err.to_string()).with_code("E0002")
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::ir::{Expr, SelectCore, SelectStatement, Source, Statement};

    #[test]
    fn test_options_builder() {
        let options = Options::default()
            .with_format(true)
            .with_collation("Latin1_General_BIN")
            .with_lock_hint("WITH(NOLOCK)");

        assert!(options.format);
        assert_eq!(options.collation, "Latin1_General_BIN");
        assert_eq!(options.lock_hint, "WITH(NOLOCK)");
        assert!(!options.no_format().format);
    }

    #[test]
    fn test_json_round_trip() {
        let statement: Statement = SelectStatement::new(SelectCore::new(
            vec![Expr::qualified("people", "name")],
            Source::table("people"),
        ))
        .with_limit(5)
        .into();

        let json = json::from_statement(&statement).unwrap();
        assert_eq!(json::to_statement(&json).unwrap(), statement);
    }

    #[test]
    fn test_json_error() {
        let error = json::to_statement("{\"Select\": 1}").unwrap_err();
        assert_eq!(error.code, Some("E0002"));
        assert!(error.to_string().starts_with("[E0002] Error: invalid type"));
    }

    #[test]
    fn test_format() {
        let statement: Statement = SelectStatement::new(SelectCore::new(
            vec![Expr::qualified("people", "name")],
            Source::table("people"),
        ))
        .into();

        let plain = compile(&statement, &Options::default()).unwrap();
        assert_snapshot!(plain, @"SELECT [people].[name] FROM [people]");

        let formatted = compile(&statement, &Options::default().with_format(true)).unwrap();
        assert!(formatted.starts_with("SELECT"));
        assert!(formatted.contains('\n'));
    }
}
