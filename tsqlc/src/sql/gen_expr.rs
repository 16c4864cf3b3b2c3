//! Renders leaf nodes: expressions, orderings, limits and FROM sources.

use itertools::Itertools;

use super::context::Context;
use super::gen_select::translate_select;
use super::quoting::{quote_identifier, quote_literal, quote_name_part};
use crate::ir::{ColumnRef, Expr, JoinKind, Lock, Ordering, Source, TableRef};
use crate::Result;

pub(super) fn translate_expr(expr: &Expr, ctx: &Context) -> Result<String> {
    Ok(match expr {
        Expr::Column(column) => translate_column(column),
        Expr::Wildcard { table: None } => "*".to_string(),
        Expr::Wildcard { table: Some(table) } => format!("{}.*", quote_identifier(table)),
        Expr::Literal(literal) => quote_literal(literal, None),
        Expr::Typed { value, ty } => quote_literal(value, Some(*ty)),
        Expr::Aggregate {
            func,
            args,
            distinct,
        } => {
            let args = if args.is_empty() {
                "*".to_string()
            } else {
                translate_list(args, ctx)?
            };
            let quantifier = if *distinct { "DISTINCT " } else { "" };
            format!("{func}({quantifier}{args})")
        }
        Expr::Function { name, args } => format!("{name}({})", translate_list(args, ctx)?),
        Expr::Alias { expr, alias } => {
            format!("{} AS {}", translate_expr(expr, ctx)?, quote_name_part(alias))
        }
        Expr::Distinct(expr) => format!("DISTINCT {}", translate_expr(expr, ctx)?),
        Expr::Binary { left, op, right } => format!(
            "{} {op} {}",
            translate_expr(left, ctx)?,
            translate_expr(right, ctx)?
        ),
        Expr::Not(expr) => format!("NOT ({})", translate_expr(expr, ctx)?),
        Expr::IsNull { expr, negated } => format!(
            "{} IS {}NULL",
            translate_expr(expr, ctx)?,
            if *negated { "NOT " } else { "" }
        ),
        Expr::InList {
            expr,
            list,
            negated,
        } => format!(
            "{} {}IN ({})",
            translate_expr(expr, ctx)?,
            if *negated { "NOT " } else { "" },
            translate_list(list, ctx)?
        ),
        Expr::InSubquery {
            expr,
            subquery,
            negated,
        } => format!(
            "{} {}IN ({})",
            translate_expr(expr, ctx)?,
            if *negated { "NOT " } else { "" },
            translate_select(subquery, ctx.options)?
        ),
        Expr::Grouping(expr) => format!("({})", translate_expr(expr, ctx)?),
        Expr::CaseSensitive(expr) => format!(
            "{} COLLATE {}",
            translate_expr(expr, ctx)?,
            ctx.options.collation
        ),
        Expr::Raw(text) => text.clone(),
    })
}

pub(super) fn translate_list(exprs: &[Expr], ctx: &Context) -> Result<String> {
    Ok(exprs
        .iter()
        .map(|e| translate_expr(e, ctx))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

pub(super) fn translate_column(column: &ColumnRef) -> String {
    match &column.table {
        Some(table) => format!("{}.{}", quote_identifier(table), quote_name_part(&column.name)),
        None => quote_name_part(&column.name),
    }
}

pub(super) fn translate_ordering(ordering: &Ordering, ctx: &Context) -> Result<String> {
    Ok(format!(
        "{} {}",
        translate_expr(&ordering.expr, ctx)?,
        ordering.direction
    ))
}

pub(super) fn translate_orderings(orders: &[Ordering], ctx: &Context) -> Result<String> {
    Ok(orders
        .iter()
        .map(|o| translate_ordering(o, ctx))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// `TOP (n)`
pub(super) fn translate_limit(limit: &Expr, ctx: &Context) -> Result<String> {
    Ok(format!("TOP ({})", translate_expr(limit, ctx)?))
}

/// Filter over the row number column of the row-numbered subquery.
pub(super) fn translate_offset(offset: &Expr, ctx: &Context) -> Result<String> {
    Ok(format!(
        "WHERE {}.{} > ({})",
        quote_name_part(&ctx.names.rnt),
        quote_name_part(&ctx.names.rn),
        translate_expr(offset, ctx)?
    ))
}

pub(super) fn translate_lock(lock: &Lock, ctx: &Context) -> String {
    match lock {
        Lock::Default => ctx.options.lock_hint.clone(),
        Lock::Hint(hint) => hint.clone(),
    }
}

/// Renders a FROM source. The lock hint goes after the leftmost table.
pub(super) fn translate_source(
    source: &Source,
    lock: Option<&Lock>,
    ctx: &Context,
) -> Result<String> {
    let with_lock = |text: String| match lock {
        Some(lock) => format!("{text} {}", translate_lock(lock, ctx)),
        None => text,
    };

    Ok(match source {
        Source::Table(table) => with_lock(translate_table(table)),
        Source::Raw(text) => with_lock(text.trim().to_string()),
        Source::Join(join) => {
            let left = translate_source(&join.left, lock, ctx)?;
            let right = match &join.right {
                Source::Join(_) => format!("({})", translate_source(&join.right, None, ctx)?),
                right => translate_source(right, None, ctx)?,
            };

            match (join.kind, &join.on) {
                (JoinKind::Fragment, _) => format!("{left} {right}"),
                (kind, Some(on)) if kind != JoinKind::Cross => {
                    format!("{left} {kind} {right} ON {}", translate_expr(on, ctx)?)
                }
                (kind, _) => format!("{left} {kind} {right}"),
            }
        }
    })
}

pub(super) fn translate_table(table: &TableRef) -> String {
    let name = (table.schema.iter())
        .chain(Some(&table.name))
        .map(|part| quote_name_part(part))
        .join(".");

    match &table.alias {
        Some(alias) => format!("{name} AS {}", quote_name_part(alias)),
        None => name,
    }
}
