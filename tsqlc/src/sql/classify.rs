//! Decides how a SELECT statement has to be rewritten.

use itertools::Itertools;
use strum_macros::AsRefStr;

use super::context::Context;
use super::gen_expr::translate_expr;
use crate::ir::fold::{ExprFold, LowercaseIdents};
use crate::ir::{ColumnRef, Expr, Ordering, SelectCore, SelectStatement};
use crate::Result;

/// Facts about the first core of a statement, computed once before emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Shape {
    pub has_limit: bool,
    pub has_offset: bool,
    pub has_join: bool,
    pub has_groups: bool,

    /// Either the set quantifier or a marker on the first projection asks for
    /// distinct rows.
    pub is_distinct: bool,
    /// Exactly one projection, carrying a distinct marker.
    pub single_distinct: bool,
    /// The single distinct projection is `table.*`.
    pub select_everything: bool,
    /// Some projection is an aggregate or function call.
    pub function_select: bool,
    pub all_aliased: bool,
    /// Exactly one projection, which is the primary key of the base table.
    pub primary_key_select: bool,
    /// Exactly one projection, which is a `COUNT`.
    pub is_bare_count: bool,
    /// Some ordering is not among the projections.
    pub order_outside_projection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub(super) enum Strategy {
    ComplexCount,
    DistinctForeignOrder,
    Paginated,
    Plain,
}

impl Shape {
    pub fn of(select: &SelectStatement, core: &SelectCore) -> Result<Self> {
        let projections = &core.projections;
        let base_table = core.source.as_ref().map(|s| s.base_table());

        let single_distinct = projections.len() == 1 && projections[0].has_distinct_marker();

        let primary_key_select = match (projections.as_slice(), &base_table) {
            ([Expr::Column(column)], Some(table)) => {
                table.primary_key.as_deref() == Some(column.name.as_str())
                    && (column.table.as_deref()).map_or(true, |t| t == table.qualifier())
            }
            _ => false,
        };

        Ok(Shape {
            has_limit: select.limit.is_some(),
            has_offset: select.offset.is_some(),
            has_join: (core.source.as_ref()).is_some_and(|s| s.has_join()),
            has_groups: !core.groups.is_empty(),
            is_distinct: core.is_distinct()
                || projections.first().is_some_and(Expr::has_distinct_marker),
            single_distinct,
            select_everything: single_distinct && projections[0].wildcard_table().is_some(),
            function_select: projections.iter().any(Expr::is_call),
            all_aliased: !projections.is_empty() && projections.iter().all(|p| p.alias().is_some()),
            primary_key_select,
            is_bare_count: projections.len() == 1 && projections[0].is_count(),
            order_outside_projection: orders_outside_projection(&select.orders, projections)?,
        })
    }

    pub fn strategy(&self) -> Strategy {
        if self.is_bare_count && self.has_limit && !self.has_join {
            Strategy::ComplexCount
        } else if self.is_distinct && self.order_outside_projection {
            Strategy::DistinctForeignOrder
        } else if self.has_offset {
            Strategy::Paginated
        } else {
            Strategy::Plain
        }
    }

    /// Paginated single distinct projection: the inner core is grouped
    /// instead of carrying the marker.
    pub fn windowed_single_distinct(&self) -> bool {
        self.single_distinct && self.has_offset
    }

    /// Limited single distinct projection, reduced with `GROUP BY` so `TOP`
    /// applies to distinct values.
    pub fn eager_limiting(&self) -> bool {
        self.single_distinct
            && self.has_limit
            && !self.has_offset
            && !self.has_groups
            && !self.select_everything
    }

    /// Limited `DISTINCT table.*` over a join.
    pub fn top_through_join(&self) -> bool {
        self.select_everything && self.has_join && self.has_limit && !self.has_offset
    }
}

/// An ordering is covered when it matches a projection (ignoring aliases,
/// distinct markers and identifier case), names a projection alias, or
/// references a table whose `table.*` is projected.
fn orders_outside_projection(orders: &[Ordering], projections: &[Expr]) -> Result<bool> {
    let normalized: Vec<Expr> = projections.iter().map(normalize).try_collect()?;
    let aliases = (projections.iter())
        .filter_map(Expr::alias)
        .map(str::to_lowercase)
        .collect_vec();
    let star_tables = (projections.iter())
        .filter_map(Expr::wildcard_table)
        .map(str::to_lowercase)
        .collect_vec();

    for ordering in orders {
        let expr = normalize(&ordering.expr)?;

        let covered = match &expr {
            Expr::Column(ColumnRef {
                table: Some(table), ..
            }) if star_tables.contains(table) => true,
            Expr::Column(ColumnRef { table: None, name }) if aliases.contains(name) => true,
            expr => normalized.contains(expr),
        };
        if !covered {
            log::debug!("ordering {ordering:?} is not among the projections");
            return Ok(true);
        }
    }
    Ok(false)
}

fn normalize(expr: &Expr) -> Result<Expr> {
    let expr = expr.without_distinct();
    LowercaseIdents.fold_expr(expr.unaliased().clone())
}

/// Removes orderings whose expressions render to the same text, keeping the
/// first. The direction is not compared: `name DESC` after `name ASC` is
/// dropped too.
pub(super) fn dedup_orders(orders: &[Ordering], ctx: &Context) -> Result<Vec<Ordering>> {
    let rendered: Vec<String> = (orders.iter())
        .map(|o| translate_expr(&o.expr, ctx))
        .try_collect()?;

    Ok(orders
        .iter()
        .zip(rendered)
        .unique_by(|(_, text)| text.clone())
        .map(|(ordering, _)| ordering.clone())
        .collect())
}
