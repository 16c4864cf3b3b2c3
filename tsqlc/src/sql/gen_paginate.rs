//! Row-numbered pagination and the complex count rewrite.

use itertools::Itertools;

use super::classify::Shape;
use super::context::Context;
use super::gen_expr::{
    translate_expr, translate_limit, translate_list, translate_offset, translate_orderings,
    translate_source,
};
use super::gen_select::{first_core, translate_core, translate_wheres};
use super::quoting::quote_name_part;
use crate::ir::fold::{ExprFold, Requalify};
use crate::ir::{BinOp, Expr, Literal, Ordering, SelectStatement};
use crate::{Error, Result, UNBOUNDED_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub(super) enum Numbering {
    #[strum(to_string = "ROW_NUMBER")]
    RowNumber,
    /// Numbers duplicates equally, so distinct rows get consecutive numbers.
    #[strum(to_string = "DENSE_RANK")]
    DenseRank,
}

/// `ROW_NUMBER() OVER ([PARTITION BY ...] ORDER BY ...)`
pub(super) fn translate_window(
    numbering: Numbering,
    partition: &[Expr],
    orders: &[Ordering],
    ctx: &Context,
) -> Result<String> {
    let mut over = Vec::new();
    if !partition.is_empty() {
        over.push(format!("PARTITION BY {}", translate_list(partition, ctx)?));
    }
    if !orders.is_empty() {
        over.push(format!("ORDER BY {}", translate_orderings(orders, ctx)?));
    }
    Ok(format!("{numbering}() OVER ({})", over.join(" ")))
}

/// Wraps the first core in a row-numbered subquery and keeps the rows
/// numbered past the offset.
pub(super) fn translate_paginated(
    select: &SelectStatement,
    shape: &Shape,
    ctx: &Context,
) -> Result<String> {
    let core = first_core(select)?;
    let names = &ctx.names;

    let (numbering, orders) = if core.is_distinct() || shape.single_distinct {
        (Numbering::DenseRank, dense_rank_orders(select, shape)?)
    } else {
        (Numbering::RowNumber, rowtable_orders(select)?)
    };

    let mut parts = vec!["SELECT".to_string()];
    if let Some(limit) = bounded_limit(select) {
        if !shape.windowed_single_distinct() {
            parts.push(translate_limit(limit, ctx)?);
        }
    }
    parts.push(rowtable_projections(select, shape, ctx)?.join(", "));

    let quantifier = if core.is_distinct() { "DISTINCT " } else { "" };
    parts.push(format!(
        "FROM (SELECT {quantifier}{} AS {}, {}) AS {}",
        translate_window(numbering, &[], &orders, ctx)?,
        quote_name_part(&names.rn),
        translate_core(select, shape, ctx, true)?,
        quote_name_part(&names.rnt),
    ));

    if let Some(offset) = &select.offset {
        parts.push(translate_offset(offset, ctx)?);
    }
    parts.push(format!(
        "ORDER BY {}.{} ASC",
        quote_name_part(&names.rnt),
        quote_name_part(&names.rn)
    ));

    Ok(parts.join(" "))
}

/// Counts rows of a limited, offset query: rows are numbered up to
/// `limit + offset` and those past the offset are counted.
pub(super) fn translate_complex_count(select: &SelectStatement, ctx: &Context) -> Result<String> {
    let core = first_core(select)?;
    let names = &ctx.names;

    let top = match (&select.limit, &select.offset) {
        (Some(limit), Some(offset)) => Some(add(limit, offset)),
        (limit, _) => limit.clone(),
    };
    let orders = rowtable_orders(select)?;

    let mut inner = vec!["SELECT".to_string()];
    if let Some(top) = &top {
        inner.push(translate_limit(top, ctx)?);
    }
    inner.push(format!(
        "{} AS {}, 1 AS {}",
        translate_window(Numbering::RowNumber, &[], &orders, ctx)?,
        quote_name_part(&names.rn),
        quote_name_part(&names.count),
    ));
    if let Some(source) = &core.source {
        inner.push(format!(
            "FROM {}",
            translate_source(source, select.lock.as_ref(), ctx)?
        ));
    }
    if !core.wheres.is_empty() {
        inner.push(format!("WHERE {}", translate_wheres(&core.wheres, ctx)?));
    }
    if !core.groups.is_empty() {
        inner.push(format!("GROUP BY {}", translate_list(&core.groups, ctx)?));
    }
    if let Some(having) = &core.having {
        inner.push(format!("HAVING {}", translate_expr(having, ctx)?));
    }
    if !select.orders.is_empty() {
        inner.push(format!(
            "ORDER BY {}",
            translate_orderings(&select.orders, ctx)?
        ));
    }

    let mut parts = vec![
        format!(
            "SELECT COUNT({}) AS [count_id]",
            quote_name_part(&names.count)
        ),
        format!(
            "FROM ({}) AS {}",
            inner.join(" "),
            quote_name_part(&names.rnt)
        ),
    ];
    if let Some(offset) = &select.offset {
        parts.push(translate_offset(offset, ctx)?);
    }

    Ok(parts.join(" "))
}

/// Orders the row numbering follows: the statement's own orders, else the
/// primary key or first column of the base table, else no particular order.
pub(super) fn rowtable_orders(select: &SelectStatement) -> Result<Vec<Ordering>> {
    if !select.orders.is_empty() {
        return Ok(select.orders.clone());
    }

    let table = first_core(select)?.source.as_ref().map(|s| s.base_table());
    let column = table.and_then(|t| t.primary_key().or_else(|| t.columns().into_iter().next()));

    Ok(match column {
        Some(column) => vec![column.asc()],
        None => {
            log::warn!(
                "no order, primary key or known column to number rows by; numbering in arbitrary order"
            );
            vec![Expr::raw("(SELECT NULL)").asc()]
        }
    })
}

/// Orders of a dense rank over distinct rows: the statement's orders, then
/// every projected expression, so that two rows share a rank exactly when
/// they are duplicates.
///
/// A `table.*` projection is ranked by the table's primary key. When nothing
/// can be ranked by, falls back to [rowtable_orders].
fn dense_rank_orders(select: &SelectStatement, shape: &Shape) -> Result<Vec<Ordering>> {
    let core = first_core(select)?;
    let base_table = core.source.as_ref().map(|s| s.base_table());

    let mut orders = select.orders.clone();
    for projection in &core.projections {
        let projection = if shape.function_select {
            projection.without_distinct()
        } else {
            projection.bare()
        };
        let expr = match (projection.unaliased(), &base_table) {
            (Expr::Wildcard { table: Some(table) }, Some(base)) if *table == base.qualifier() => {
                match base.primary_key() {
                    Some(key) => Expr::Column(key),
                    None => continue,
                }
            }
            (Expr::Wildcard { .. }, _) => continue,
            (expr, _) => expr.clone(),
        };
        if !orders.iter().any(|o| o.expr == expr) {
            orders.push(expr.asc());
        }
    }

    if orders.is_empty() {
        log::debug!("no rankable projection; ranking by the row table orders");
        return rowtable_orders(select);
    }
    Ok(orders)
}

/// Projections of the outer query, referencing the row-numbered subquery.
fn rowtable_projections(
    select: &SelectStatement,
    shape: &Shape,
    ctx: &Context,
) -> Result<Vec<String>> {
    let core = first_core(select)?;
    let rnt = &ctx.names.rnt;
    let qualifier = core.source.as_ref().map(|s| s.base_table());
    let qualifier = qualifier.as_ref().map(|t| t.qualifier()).unwrap_or_default();

    let top = bounded_limit(select)
        .map(|limit| translate_limit(limit, ctx))
        .transpose()?;

    let outer_reference = |projection: &Expr| -> Result<String> {
        let projection = projection.without_distinct();
        let reference = match projection.alias().map(str::to_string) {
            Some(alias) => Expr::qualified(rnt, alias),
            None => Requalify {
                from: qualifier,
                to: rnt,
            }
            .fold_expr(projection)?,
        };
        translate_expr(&reference, ctx)
    };

    if shape.windowed_single_distinct() && core.groups.is_empty() {
        (core.projections.iter())
            .map(|p| -> Result<String> {
                let text = outer_reference(p)?;
                Ok(match &top {
                    Some(top) => format!("{top} {text}"),
                    None => text,
                })
            })
            .try_collect()
    } else if shape.single_distinct {
        (core.projections.iter())
            .map(|p| -> Result<String> {
                let text = outer_reference(p)?;
                Ok(match &top {
                    Some(top) => format!("DISTINCT {top} {text}"),
                    None => format!("DISTINCT {text}"),
                })
            })
            .try_collect()
    } else if shape.has_join && shape.all_aliased {
        Ok((core.projections.iter())
            .filter_map(Expr::alias)
            .map(quote_name_part)
            .collect())
    } else if shape.primary_key_select {
        let column = (core.projections.first())
            .and_then(Expr::as_column)
            .ok_or_else(|| Error::new_assert("primary key select without a column projection"))?;
        Ok(vec![format!(
            "{}.{}",
            quote_name_part(rnt),
            quote_name_part(&column.name)
        )])
    } else {
        Ok(vec![format!("{}.*", quote_name_part(rnt))])
    }
}

/// The limit, unless it is the unbounded sentinel.
fn bounded_limit(select: &SelectStatement) -> Option<&Expr> {
    (select.limit.as_ref()).filter(|limit| **limit != Expr::int(UNBOUNDED_LIMIT))
}

fn add(left: &Expr, right: &Expr) -> Expr {
    match (left, right) {
        (Expr::Literal(Literal::Integer(l)), Expr::Literal(Literal::Integer(r))) => {
            Expr::int(l.saturating_add(*r))
        }
        _ => Expr::binary(left.clone(), BinOp::Add, right.clone()),
    }
}
