//! Entry point for SELECT statements and the plain emitter.

use itertools::Itertools;

use super::classify::{dedup_orders, Shape, Strategy};
use super::context::Context;
use super::fixup::correlate_joins;
use super::gen_distinct::translate_distinct_foreign_order;
use super::gen_expr::{
    translate_expr, translate_limit, translate_list, translate_orderings, translate_source,
};
use super::gen_paginate::{translate_complex_count, translate_paginated};
use super::quoting::quote_name_part;
use crate::ir::{AggregateFunc, Expr, Ordering, SelectCore, SelectStatement};
use crate::{Error, Options, Result, WithErrorInfo};

pub(super) fn translate_select(select: &SelectStatement, options: &Options) -> Result<String> {
    let ctx = Context::new(select, options)?;

    let mut select = select.clone();
    select.orders = dedup_orders(&select.orders, &ctx)?;

    let core = first_core(&select)?;
    let shape = Shape::of(&select, core)?;
    let strategy = shape.strategy();
    log::debug!("compiling SELECT as {}", strategy.as_ref());

    match strategy {
        Strategy::ComplexCount => translate_complex_count(&select, &ctx),
        Strategy::DistinctForeignOrder => translate_distinct_foreign_order(&select, &ctx),
        Strategy::Paginated => translate_paginated(&correlate_joins(&select), &shape, &ctx),
        Strategy::Plain => translate_plain(&correlate_joins(&select), &shape, &ctx),
    }
}

pub(super) fn first_core(select: &SelectStatement) -> Result<&SelectCore> {
    select.cores.first().ok_or_else(|| {
        Error::new_simple("SELECT statement has no core")
            .push_hint("add a core with projections and a source")
            .with_code("E0001")
    })
}

fn translate_plain(select: &SelectStatement, shape: &Shape, ctx: &Context) -> Result<String> {
    translate_core(select, shape, ctx, false)
}

/// Renders the first core.
///
/// In windowed mode the result is the body of a row-numbered subquery: it
/// starts at the projection list and has no `TOP` or `ORDER BY`.
pub(super) fn translate_core(
    select: &SelectStatement,
    shape: &Shape,
    ctx: &Context,
    windowed: bool,
) -> Result<String> {
    let core = first_core(select)?;

    let mut projections = core.projections.clone();
    let mut groups = core.groups.clone();
    let mut orders = select.orders.clone();

    if windowed {
        if !shape.function_select {
            projections = projections.iter().map(Expr::bare).collect();
        }
        if shape.windowed_single_distinct() {
            if groups.is_empty() {
                groups = projections.iter().map(|p| p.bare().unaliased().clone()).collect();
            }
            for ordering in &orders {
                if !groups.contains(&ordering.expr) {
                    groups.push(ordering.expr.clone());
                }
            }
        }
    } else if shape.eager_limiting() {
        log::debug!("limiting distinct values with GROUP BY");
        projections = projections.iter().map(Expr::bare).collect();
        groups = projections.iter().map(|p| p.unaliased().clone()).collect();
        orders = orders.iter().map(aggregate_ordering).collect();
    } else if shape.top_through_join() {
        projections = projections.iter().map(Expr::bare).collect();
    }

    // A marker on the first projection is rendered as the set quantifier,
    // so that it precedes `TOP`.
    let marked = !windowed && projections.first().is_some_and(Expr::has_distinct_marker);
    if marked {
        projections[0] = projections[0].without_distinct();
    }

    let mut parts = Vec::new();
    if !windowed {
        parts.push("SELECT".to_string());
        if core.is_distinct() || marked {
            parts.push("DISTINCT".to_string());
        }
        if let Some(limit) = &select.limit {
            parts.push(translate_limit(limit, ctx)?);
        }
    }

    parts.push(translate_projections(&projections, ctx)?);

    if let Some(source) = &core.source {
        parts.push(format!(
            "FROM {}",
            translate_source(source, select.lock.as_ref(), ctx)?
        ));
    }
    if !core.wheres.is_empty() {
        parts.push(format!("WHERE {}", translate_wheres(&core.wheres, ctx)?));
    }
    if !groups.is_empty() {
        parts.push(format!("GROUP BY {}", translate_list(&groups, ctx)?));
    }
    if let Some(having) = &core.having {
        parts.push(format!("HAVING {}", translate_expr(having, ctx)?));
    }
    if !windowed && !orders.is_empty() {
        parts.push(format!("ORDER BY {}", translate_orderings(&orders, ctx)?));
    }

    Ok(parts.join(" "))
}

/// A bare `1` gets an alias, so that wrapping queries can project it.
pub(super) fn translate_projections(projections: &[Expr], ctx: &Context) -> Result<String> {
    let projections: Vec<String> = (projections.iter())
        .map(|p| -> Result<String> {
            let text = translate_expr(p, ctx)?;
            Ok(if p.is_literal_one() {
                format!("{text} AS {}", quote_name_part(&ctx.names.wrp))
            } else {
                text
            })
        })
        .try_collect()?;
    Ok(projections.join(", "))
}

pub(super) fn translate_wheres(wheres: &[Expr], ctx: &Context) -> Result<String> {
    let wheres: Vec<String> = wheres.iter().map(|w| translate_expr(w, ctx)).try_collect()?;
    Ok(wheres.join(" AND "))
}

/// Orders a grouped distinct value by the extreme of the ordered expression,
/// `MAX` for descending and `MIN` for ascending.
fn aggregate_ordering(ordering: &Ordering) -> Ordering {
    let func = if ordering.is_descending() {
        AggregateFunc::Max
    } else {
        AggregateFunc::Min
    };
    Ordering::new(
        Expr::aggregate(func, ordering.expr.bare().unaliased().clone()),
        ordering.direction,
    )
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::ir::{JoinKind, Lock, Source, TableRef};

    fn compile(select: &SelectStatement) -> String {
        translate_select(select, &Options::default()).unwrap()
    }

    #[test]
    fn test_plain() {
        let core = SelectCore::new(
            vec![Expr::qualified("people", "name"), Expr::count(vec![]).aliased("n")],
            Source::table("people"),
        )
        .with_wheres(vec![
            Expr::qualified("people", "age").eq(Expr::int(30)),
            Expr::qualified("people", "active").eq(Expr::int(1)),
        ])
        .with_groups(vec![Expr::qualified("people", "name")])
        .with_having(Expr::binary(
            Expr::count(vec![]),
            crate::ir::BinOp::Gt,
            Expr::int(1),
        ));
        let select = SelectStatement::new(core)
            .with_orders(vec![Expr::qualified("people", "name").asc()])
            .with_limit(10);

        assert_snapshot!(compile(&select), @"SELECT TOP (10) [people].[name], COUNT(*) AS [n] FROM [people] WHERE [people].[age] = 30 AND [people].[active] = 1 GROUP BY [people].[name] HAVING COUNT(*) > 1 ORDER BY [people].[name] ASC");
    }

    #[test]
    fn test_literal_one() {
        let select = SelectStatement::new(SelectCore::new(vec![Expr::int(1)], Source::table("people")))
            .with_limit(1);
        assert_snapshot!(compile(&select), @"SELECT TOP (1) 1 AS [__wrp] FROM [people]");
    }

    #[test]
    fn test_lock() {
        let select = SelectStatement::new(SelectCore::new(
            vec![Expr::all_of("p")],
            TableRef::new("people").with_alias("p").into(),
        ))
        .with_lock(Lock::Default);
        assert_snapshot!(compile(&select), @"SELECT [p].* FROM [people] AS [p] WITH(HOLDLOCK, ROWLOCK)");
    }

    #[test]
    fn test_eager_limiting() {
        let select = SelectStatement::new(SelectCore::new(
            vec![Expr::qualified("people", "name").distinct()],
            Source::table("people"),
        ))
        .with_orders(vec![Expr::qualified("people", "name").desc()])
        .with_limit(5);

        assert_snapshot!(compile(&select), @"SELECT TOP (5) [people].[name] FROM [people] GROUP BY [people].[name] ORDER BY MAX([people].[name]) DESC");
    }

    #[test]
    fn test_top_through_join() {
        let source = Source::table("people").join(
            JoinKind::Inner,
            Source::table("pets"),
            Some(Expr::qualified("pets", "owner_id").eq(Expr::qualified("people", "id"))),
        );
        let select = SelectStatement::new(SelectCore::new(
            vec![Expr::all_of("people").distinct()],
            source,
        ))
        .with_limit(3);

        assert_snapshot!(compile(&select), @"SELECT TOP (3) [people].* FROM [people] INNER JOIN [pets] ON [pets].[owner_id] = [people].[id]");
    }

    #[test]
    fn test_distinct_star_with_limit() {
        let select = SelectStatement::new(SelectCore::new(
            vec![Expr::all_of("people").distinct()],
            Source::table("people"),
        ))
        .with_orders(vec![Expr::qualified("people", "age").asc()])
        .with_limit(5);

        assert_snapshot!(compile(&select), @"SELECT DISTINCT TOP (5) [people].* FROM [people] ORDER BY [people].[age] ASC");
    }

    #[test]
    fn test_count_distinct() {
        let count_names = Expr::Aggregate {
            func: AggregateFunc::Count,
            args: vec![Expr::qualified("people", "name")],
            distinct: true,
        };
        let core = SelectCore::new(vec![count_names.aliased("n")], Source::table("people"))
            .with_groups(vec![Expr::qualified("people", "city")]);
        let select = SelectStatement::new(core)
            .with_orders(vec![Expr::qualified("people", "city").asc()]);

        assert_snapshot!(compile(&select), @"SELECT COUNT(DISTINCT [people].[name]) AS [n] FROM [people] GROUP BY [people].[city] ORDER BY [people].[city] ASC");
    }

    #[test]
    fn test_no_core() {
        let error = translate_select(&SelectStatement::default(), &Options::default()).unwrap_err();
        assert_snapshot!(error.to_string(), @r"
        [E0001] Error: SELECT statement has no core
        ↳ Hint: add a core with projections and a source
        ");
    }
}
