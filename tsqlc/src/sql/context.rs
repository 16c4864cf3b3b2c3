//! State carried through the translation of a single SELECT statement.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::ir::fold::{fold_expr, ExprFold};
use crate::ir::{ColumnRef, Expr, SelectStatement, Source};
use crate::utils::NameGenerator;
use crate::{Options, Result};

pub(super) struct Context<'a> {
    pub options: &'a Options,
    pub names: SyntheticNames,
}

/// Names of the wrapper relations and helper columns the rewrites introduce.
#[derive(Debug, Clone)]
pub(super) struct SyntheticNames {
    /// Row number column.
    pub rn: String,
    /// Row-numbered subquery.
    pub rnt: String,
    /// Dense rank of the requested order.
    pub order: String,
    /// Row number within a group of duplicates.
    pub joined_row_num: String,
    /// Row number of the ranked output.
    pub offset: String,
    /// Offset wrapper subquery.
    pub osq: String,
    /// Reconciliation subquery.
    pub sq: String,
    /// Alias for a bare literal `1` projection.
    pub wrp: String,
    /// Counted column of a complex count.
    pub count: String,
}

impl<'a> Context<'a> {
    pub fn new(select: &SelectStatement, options: &'a Options) -> Result<Self> {
        let taken = collect_names(select)?;
        Ok(Context {
            options,
            names: SyntheticNames::avoiding(taken),
        })
    }

    /// Context for statements that introduce no synthetic names.
    pub fn bare(options: &'a Options) -> Self {
        Context {
            options,
            names: SyntheticNames::avoiding(HashSet::new()),
        }
    }
}

impl SyntheticNames {
    fn avoiding(taken: HashSet<String>) -> Self {
        let mut gen = NameGenerator::new(taken);
        SyntheticNames {
            rn: gen.gen("__rn"),
            rnt: gen.gen("__rnt"),
            order: gen.gen("__order"),
            joined_row_num: gen.gen("__joined_row_num"),
            offset: gen.gen("__offset"),
            osq: gen.gen("__osq"),
            sq: gen.gen("__sq"),
            wrp: gen.gen("__wrp"),
            count: gen.gen("count"),
        }
    }
}

/// Names the caller already uses in the first core: projection aliases,
/// column names and table names or aliases. Raw SQL fragments contribute
/// every identifier they contain.
fn collect_names(select: &SelectStatement) -> Result<HashSet<String>> {
    let mut collector = NameCollector::default();

    if let Some(core) = select.cores.first() {
        collector.fold_exprs(core.projections.clone())?;
        collector.fold_exprs(core.wheres.clone())?;
        collector.fold_exprs(core.groups.clone())?;
        if let Some(having) = &core.having {
            collector.fold_expr(having.clone())?;
        }
        if let Some(source) = &core.source {
            collector.collect_source(source)?;
        }
    }
    for ordering in &select.orders {
        collector.fold_ordering(ordering.clone())?;
    }

    Ok(collector.names)
}

#[derive(Default)]
struct NameCollector {
    names: HashSet<String>,
}

impl NameCollector {
    fn collect_source(&mut self, source: &Source) -> Result<()> {
        match source {
            Source::Table(table) => {
                self.names.insert(table.name.clone());
                self.names.extend(table.alias.clone());
            }
            Source::Join(join) => {
                self.collect_source(&join.left)?;
                self.collect_source(&join.right)?;
                if let Some(on) = &join.on {
                    self.fold_expr(on.clone())?;
                }
            }
            Source::Raw(text) => self.collect_raw(text),
        }
        Ok(())
    }

    fn collect_raw(&mut self, text: &str) {
        for captures in raw_ident_regex().captures_iter(text) {
            if let Some(name) = captures.get(1).or_else(|| captures.get(2)) {
                self.names.insert(name.as_str().to_string());
            }
        }
    }
}

fn raw_ident_regex() -> &'static Regex {
    static RAW_IDENT: OnceLock<Regex> = OnceLock::new();
    RAW_IDENT.get_or_init(|| Regex::new(r"\[([^\]]+)\]|([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

impl ExprFold for NameCollector {
    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        match &expr {
            Expr::Alias { alias, .. } => {
                self.names.insert(alias.clone());
            }
            Expr::Raw(text) => self.collect_raw(text),
            _ => {}
        }
        fold_expr(self, expr)
    }

    fn fold_column(&mut self, column: ColumnRef) -> Result<ColumnRef> {
        self.names.insert(column.name.clone());
        self.names.extend(column.table.clone());
        Ok(column)
    }
}
