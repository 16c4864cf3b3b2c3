//! UPDATE statements, with ordered or limited updates restricted by key.

use super::context::Context;
use super::fixup::guard_update_limit;
use super::gen_expr::{translate_column, translate_expr, translate_limit, translate_table};
use super::gen_select::translate_wheres;
use crate::ir::{Expr, SelectCore, SelectStatement, Source, UpdateStatement};
use crate::{Options, Result, UNBOUNDED_LIMIT};

/// Renders an UPDATE. Ordered or limited updates restrict the rows through
/// the key column: `WHERE key IN (SELECT TOP (n) key ... ORDER BY ...)`.
pub(super) fn translate_update(update: &UpdateStatement, options: &Options) -> Result<String> {
    let update = guard_update_limit(update);
    let ctx = Context::bare(options);

    let mut parts = vec!["UPDATE".to_string()];

    let key = (update.key.clone()).or_else(|| update.relation.primary_key());
    let restricted = !update.orders.is_empty() || update.limit.is_some();

    if restricted && key.is_none() {
        log::warn!(
            "UPDATE of `{}` is ordered or limited but has no key column; ordering is dropped",
            update.relation.name
        );
        let bounded = (update.limit.as_ref()).filter(|l| **l != Expr::int(UNBOUNDED_LIMIT));
        if let Some(limit) = bounded {
            parts.push(translate_limit(limit, &ctx)?);
        }
    }
    parts.push(translate_table(&update.relation));

    let values: Vec<String> = (update.values.iter())
        .map(|(column, value)| -> Result<String> {
            Ok(format!(
                "{} = {}",
                translate_column(column),
                translate_expr(value, &ctx)?
            ))
        })
        .collect::<Result<_>>()?;
    parts.push(format!("SET {}", values.join(", ")));

    let wheres = match key {
        Some(key) if restricted => {
            let core = SelectCore::new(
                vec![Expr::Column(key.clone())],
                Source::Table(update.relation.clone()),
            )
            .with_wheres(update.wheres.clone());
            let subquery = SelectStatement {
                orders: update.orders.clone(),
                limit: update.limit.clone(),
                ..SelectStatement::new(core)
            };

            vec![Expr::InSubquery {
                expr: Box::new(Expr::Column(key)),
                subquery: Box::new(subquery),
                negated: false,
            }]
        }
        _ => update.wheres.clone(),
    };
    if !wheres.is_empty() {
        parts.push(format!("WHERE {}", translate_wheres(&wheres, &ctx)?));
    }

    Ok(parts.join(" "))
}
