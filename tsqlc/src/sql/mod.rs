//! Backend for translating statements into SQL Server text.

mod classify;
mod context;
mod fixup;
mod gen_distinct;
mod gen_expr;
mod gen_paginate;
mod gen_select;
mod gen_update;
mod quoting;

pub use gen_distinct::columns_for_distinct;
pub use quoting::{quote_identifier, quote_literal};

use crate::ir::Statement;
use crate::{Options, Result};

/// Translate a statement into unformatted SQL.
pub(crate) fn compile(statement: &Statement, options: &Options) -> Result<String> {
    let sql = match statement {
        Statement::Select(select) => gen_select::translate_select(select, options)?,
        Statement::Update(update) => gen_update::translate_update(update, options)?,
    };
    log::debug!("emitted: {sql}");
    Ok(sql)
}
