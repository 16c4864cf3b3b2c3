//! A trait to "fold" an expression tree (similar to a visitor), so we can
//! transitively apply some logic to a whole tree by just defining how we want
//! to handle each type.

use itertools::Itertools;

use super::{ColumnRef, Expr, Ordering};
use crate::Result;

// Fold pattern:
// - https://rust-unofficial.github.io/patterns/patterns/creational/fold.html
//
// Default behaviour lives in free functions, so implementors can override a
// single method and still delegate to the default for the other variants.
pub trait ExprFold {
    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        fold_expr(self, expr)
    }
    fn fold_exprs(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
        exprs.into_iter().map(|e| self.fold_expr(e)).try_collect()
    }
    fn fold_column(&mut self, column: ColumnRef) -> Result<ColumnRef> {
        Ok(column)
    }
    /// Qualifier of a `table.*` wildcard.
    fn fold_wildcard_table(&mut self, table: String) -> Result<String> {
        Ok(table)
    }
    fn fold_ordering(&mut self, ordering: Ordering) -> Result<Ordering> {
        Ok(Ordering {
            expr: self.fold_expr(ordering.expr)?,
            direction: ordering.direction,
        })
    }
}

pub fn fold_expr<F: ?Sized + ExprFold>(fold: &mut F, expr: Expr) -> Result<Expr> {
    use Expr::*;
    Ok(match expr {
        Column(column) => Column(fold.fold_column(column)?),
        Wildcard { table } => Wildcard {
            table: table.map(|t| fold.fold_wildcard_table(t)).transpose()?,
        },
        Aggregate {
            func,
            args,
            distinct,
        } => Aggregate {
            func,
            args: fold.fold_exprs(args)?,
            distinct,
        },
        Function { name, args } => Function {
            name,
            args: fold.fold_exprs(args)?,
        },
        Alias { expr, alias } => Alias {
            expr: Box::new(fold.fold_expr(*expr)?),
            alias,
        },
        Distinct(expr) => Distinct(Box::new(fold.fold_expr(*expr)?)),
        Binary { left, op, right } => Binary {
            left: Box::new(fold.fold_expr(*left)?),
            op,
            right: Box::new(fold.fold_expr(*right)?),
        },
        Not(expr) => Not(Box::new(fold.fold_expr(*expr)?)),
        IsNull { expr, negated } => IsNull {
            expr: Box::new(fold.fold_expr(*expr)?),
            negated,
        },
        InList {
            expr,
            list,
            negated,
        } => InList {
            expr: Box::new(fold.fold_expr(*expr)?),
            list: fold.fold_exprs(list)?,
            negated,
        },
        // subqueries have their own scope
        InSubquery {
            expr,
            subquery,
            negated,
        } => InSubquery {
            expr: Box::new(fold.fold_expr(*expr)?),
            subquery,
            negated,
        },
        Grouping(expr) => Grouping(Box::new(fold.fold_expr(*expr)?)),
        CaseSensitive(expr) => CaseSensitive(Box::new(fold.fold_expr(*expr)?)),
        Literal(_) | Typed { .. } | Raw(_) => expr,
    })
}

/// Redirects references qualified by one table to another qualifier.
pub struct Requalify<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

impl ExprFold for Requalify<'_> {
    fn fold_column(&mut self, mut column: ColumnRef) -> Result<ColumnRef> {
        if column.table.as_deref() == Some(self.from) {
            column.table = Some(self.to.to_string());
        }
        Ok(column)
    }

    fn fold_wildcard_table(&mut self, table: String) -> Result<String> {
        Ok(if table == self.from {
            self.to.to_string()
        } else {
            table
        })
    }
}

/// Lower-cases all identifiers, so expressions can be compared regardless of
/// how the caller spelled them.
pub struct LowercaseIdents;

impl ExprFold for LowercaseIdents {
    fn fold_column(&mut self, column: ColumnRef) -> Result<ColumnRef> {
        Ok(ColumnRef {
            table: column.table.map(|t| t.to_lowercase()),
            name: column.name.to_lowercase(),
        })
    }

    fn fold_wildcard_table(&mut self, table: String) -> Result<String> {
        Ok(table.to_lowercase())
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        match expr {
            Expr::Raw(text) => Ok(Expr::Raw(text.to_lowercase())),
            Expr::Function { name, args } => Ok(Expr::Function {
                name: name.to_lowercase(),
                args: self.fold_exprs(args)?,
            }),
            expr => fold_expr(self, expr),
        }
    }
}
