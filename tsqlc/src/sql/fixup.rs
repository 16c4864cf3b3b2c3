//! Pure rewrites applied to a statement before it is emitted.

use std::sync::OnceLock;

use regex::Regex;

use crate::ir::{Expr, JoinKind, SelectStatement, Source, UpdateStatement};
use crate::UNBOUNDED_LIMIT;

/// Correlates a raw join fragment that joins again a table the statement
/// already left-outer-joins.
///
/// Without an alias, SQL Server binds the fragment's condition to the first
/// occurrence of the table. The fragment's table gets the alias `<t>_crltd`
/// and the first reference to it in the condition is redirected there.
/// Applying this twice changes nothing.
pub(super) fn correlate_joins(select: &SelectStatement) -> SelectStatement {
    let mut select = select.clone();
    if let Some(core) = select.cores.first_mut() {
        core.source = core.source.take().map(correlate_source);
    }
    select
}

fn correlate_source(source: Source) -> Source {
    let Source::Join(mut join) = source else {
        return source;
    };
    if join.kind != JoinKind::Fragment {
        return Source::Join(join);
    }

    let joined_table = match &join.left {
        Source::Join(outer) if outer.kind == JoinKind::LeftOuter => match &outer.right {
            Source::Table(table) => Some(table.name.clone()),
            _ => None,
        },
        _ => None,
    };

    if let (Some(table), Source::Raw(fragment)) = (joined_table, &join.right) {
        if let Some(fixed) = correlate_fragment(fragment, &table) {
            log::debug!("correlated join fragment on `{table}`: {fixed}");
            join.right = Source::Raw(fixed);
        }
    }
    Source::Join(join)
}

fn join_table_regex() -> &'static Regex {
    static JOIN_TABLE: OnceLock<Regex> = OnceLock::new();
    JOIN_TABLE.get_or_init(|| Regex::new(r"JOIN \[([^\]]+)\]").unwrap())
}

/// Returns the fragment with the alias inserted, or `None` when it does not
/// join `table` or is already correlated.
fn correlate_fragment(fragment: &str, table: &str) -> Option<String> {
    let captures = join_table_regex().captures(fragment)?;
    if &captures[1] != table {
        return None;
    }

    let alias = format!("[{table}_crltd]");
    if fragment.contains(&format!("AS {alias}")) {
        return None;
    }

    let on = fragment.find(" ON ")?;
    let mut fixed = fragment.to_string();
    fixed.insert_str(on, &format!(" AS {alias}"));

    let (head, condition) = fixed.split_at(on + alias.len() + 4);
    Some(format!(
        "{head}{}",
        condition.replacen(&format!("[{table}]."), &format!("{alias}."), 1)
    ))
}

/// Ordered updates without a limit get [UNBOUNDED_LIMIT], so the key
/// restriction can carry the ordering.
pub(super) fn guard_update_limit(update: &UpdateStatement) -> UpdateStatement {
    let mut update = update.clone();
    if !update.orders.is_empty() && update.limit.is_none() {
        update.limit = Some(Expr::int(UNBOUNDED_LIMIT));
    }
    update
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::ir::{ColumnRef, SelectCore, TableRef};

    fn fragment_select(fragment: &str) -> SelectStatement {
        let source = Source::table("people")
            .join(
                JoinKind::LeftOuter,
                Source::table("pets"),
                Some(Expr::qualified("pets", "owner_id").eq(Expr::qualified("people", "id"))),
            )
            .join(JoinKind::Fragment, Source::Raw(fragment.to_string()), None);

        SelectStatement::new(SelectCore::new(vec![Expr::all_of("people")], source))
    }

    fn fragment_of(select: &SelectStatement) -> &str {
        let join = select.cores[0].source.as_ref().unwrap().as_join().unwrap();
        join.right.as_raw().unwrap()
    }

    #[test]
    fn test_correlate_joins() {
        let select =
            fragment_select("INNER JOIN [pets] ON [pets].[kind] = [people].[favorite_kind]");

        let fixed = correlate_joins(&select);
        assert_snapshot!(
            fragment_of(&fixed),
            @"INNER JOIN [pets] AS [pets_crltd] ON [pets_crltd].[kind] = [people].[favorite_kind]"
        );

        // idempotent
        assert_eq!(correlate_joins(&fixed), fixed);

        // input untouched
        assert_ne!(select, fixed);
    }

    #[test]
    fn test_unrelated_fragment() {
        let select = fragment_select("INNER JOIN [toys] ON [toys].[pet_id] = [pets].[id]");
        assert_eq!(correlate_joins(&select), select);
    }

    #[test]
    fn test_guard_update_limit() {
        let update = UpdateStatement {
            relation: TableRef::new("t"),
            values: vec![(ColumnRef::new("x"), Expr::int(1))],
            wheres: vec![],
            orders: vec![Expr::column("y").asc()],
            limit: None,
            key: None,
        };

        let guarded = guard_update_limit(&update);
        assert_eq!(guarded.limit, Some(Expr::int(i64::MAX)));

        let limited = UpdateStatement {
            limit: Some(Expr::int(3)),
            ..update.clone()
        };
        assert_eq!(guard_update_limit(&limited), limited);

        let unordered = UpdateStatement {
            orders: vec![],
            ..update
        };
        assert_eq!(guard_update_limit(&unordered).limit, None);
    }
}
