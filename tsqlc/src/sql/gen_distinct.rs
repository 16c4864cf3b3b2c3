//! Distinct projections ordered by expressions outside the projection.
//!
//! SQL Server requires `ORDER BY` items to appear in a `SELECT DISTINCT`
//! list. Each group of duplicates is reduced to its first row in the
//! requested order, and that row's dense rank is carried out as the order.

use itertools::Itertools;

use super::context::Context;
use super::gen_expr::{translate_expr, translate_limit, translate_list, translate_source};
use super::gen_paginate::{translate_window, Numbering};
use super::gen_select::{first_core, translate_wheres};
use super::quoting::quote_name_part;
use crate::ir::{Expr, Ordering, SelectCore, SelectStatement};
use crate::Result;

pub(super) fn translate_distinct_foreign_order(
    select: &SelectStatement,
    ctx: &Context,
) -> Result<String> {
    let core = first_core(select)?;
    let names = &ctx.names;
    let order = quote_name_part(&names.order);
    let joined_row_num = quote_name_part(&names.joined_row_num);
    let offset_name = quote_name_part(&names.offset);

    let projections = core.projections.iter().map(Expr::without_distinct).collect_vec();
    let partition = partition_exprs(core, &projections);

    let mut inner = vec![format!(
        "SELECT {}, {} AS {order}, {} AS {joined_row_num}",
        translate_list(&projections, ctx)?,
        translate_window(Numbering::DenseRank, &[], &select.orders, ctx)?,
        translate_window(Numbering::RowNumber, &partition, &select.orders, ctx)?,
    )];
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

    let mut outer_projections: Vec<String> = (projections.iter())
        .map(|p| outer_name(p, ctx))
        .try_collect()?;
    if select.offset.is_some() {
        outer_projections.push(format!(
            "ROW_NUMBER() OVER (ORDER BY {order}) AS {offset_name}"
        ));
    } else {
        outer_projections.push(order.clone());
    }

    let mut parts = vec!["SELECT".to_string()];
    if select.offset.is_none() {
        parts.push("DISTINCT".to_string());
        if let Some(limit) = &select.limit {
            parts.push(translate_limit(limit, ctx)?);
        }
    }
    parts.push(outer_projections.join(", "));
    parts.push(format!(
        "FROM ({}) AS {}",
        inner.join(" "),
        quote_name_part(&names.sq)
    ));
    parts.push(format!("WHERE {joined_row_num} = 1"));
    if select.offset.is_none() {
        parts.push(format!("ORDER BY {order}"));
    }
    let sql = parts.join(" ");

    let Some(offset) = &select.offset else {
        return Ok(sql);
    };

    let mut parts = vec!["SELECT DISTINCT".to_string()];
    if let Some(limit) = &select.limit {
        parts.push(translate_limit(limit, ctx)?);
    }
    parts.push(format!("* FROM ({sql}) AS {}", quote_name_part(&names.osq)));
    parts.push(format!(
        "WHERE {offset_name} > {}",
        translate_expr(offset, ctx)?
    ));
    parts.push(format!("ORDER BY {offset_name}"));
    Ok(parts.join(" "))
}

/// Expressions identifying duplicates. A `table.*` of the base table is
/// identified by the table's primary key when it is known.
fn partition_exprs(core: &SelectCore, projections: &[Expr]) -> Vec<Expr> {
    let base_table = core.source.as_ref().map(|s| s.base_table());

    (projections.iter())
        .map(|p| {
            let p = p.unaliased();
            match (p.wildcard_table(), &base_table) {
                (Some(table), Some(base)) if table == base.qualifier() => {
                    base.primary_key().map_or_else(|| p.clone(), Expr::Column)
                }
                _ => p.clone(),
            }
        })
        .collect()
}

/// How the outer query names a projection of the inner one.
fn outer_name(projection: &Expr, ctx: &Context) -> Result<String> {
    Ok(match projection {
        Expr::Alias { alias, .. } => quote_name_part(alias),
        Expr::Column(column) => quote_name_part(&column.name),
        Expr::Wildcard { .. } => "*".to_string(),
        expr => translate_expr(expr, ctx)?,
    })
}

/// Columns a `SELECT DISTINCT` needs so it can be ordered by `orders`: the
/// requested columns, followed by each ordered expression not among them.
pub fn columns_for_distinct(columns: &[Expr], orders: &[Ordering]) -> Vec<Expr> {
    let mut result = columns.to_vec();
    for ordering in orders {
        if !result.contains(&ordering.expr) {
            result.push(ordering.expr.clone());
        }
    }
    result
}
