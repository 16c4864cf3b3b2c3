use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::{ColumnRef, Expr, Ordering};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Statement {
    Select(SelectStatement),
    Update(UpdateStatement),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Only the first core takes part in rewriting.
    pub cores: Vec<SelectCore>,
    pub orders: Vec<Ordering>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub lock: Option<Lock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectCore {
    pub projections: Vec<Expr>,
    pub source: Option<Source>,
    /// Conjunctive predicates.
    pub wheres: Vec<Expr>,
    pub groups: Vec<Expr>,
    pub having: Option<Expr>,
    pub set_quantifier: Option<SetQuantifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetQuantifier {
    Distinct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Source {
    Table(TableRef),
    Join(Box<Join>),
    /// Pre-rendered FROM text.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub left: Source,
    pub right: Source,
    pub on: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum JoinKind {
    #[strum(to_string = "INNER JOIN")]
    Inner,
    #[strum(to_string = "LEFT OUTER JOIN")]
    LeftOuter,
    #[strum(to_string = "RIGHT OUTER JOIN")]
    RightOuter,
    #[strum(to_string = "FULL OUTER JOIN")]
    FullOuter,
    #[strum(to_string = "CROSS JOIN")]
    Cross,
    /// The right side is a [Source::Raw] fragment that already contains its
    /// own join keyword and condition.
    Fragment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    pub schema: Option<String>,
    pub alias: Option<String>,

    /// Supplied by the schema layer.
    pub primary_key: Option<String>,
    /// Supplied by the schema layer, in table order.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lock {
    /// Renders [crate::Options::lock_hint].
    Default,
    Hint(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub relation: TableRef,
    pub values: Vec<(ColumnRef, Expr)>,
    pub wheres: Vec<Expr>,
    pub orders: Vec<Ordering>,
    pub limit: Option<Expr>,
    /// Column identifying rows, used to restrict ordered or limited updates.
    pub key: Option<ColumnRef>,
}

impl SelectStatement {
    pub fn new(core: SelectCore) -> Self {
        SelectStatement {
            cores: vec![core],
            ..Default::default()
        }
    }

    pub fn with_orders(mut self, orders: Vec<Ordering>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_limit<E: Into<Expr>>(mut self, limit: E) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn with_offset<E: Into<Expr>>(mut self, offset: E) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn with_lock(mut self, lock: Lock) -> Self {
        self.lock = Some(lock);
        self
    }
}

impl SelectCore {
    pub fn new(projections: Vec<Expr>, source: Source) -> Self {
        SelectCore {
            projections,
            source: Some(source),
            ..Default::default()
        }
    }

    pub fn with_wheres(mut self, wheres: Vec<Expr>) -> Self {
        self.wheres = wheres;
        self
    }

    pub fn with_groups(mut self, groups: Vec<Expr>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_having(mut self, having: Expr) -> Self {
        self.having = Some(having);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.set_quantifier = Some(SetQuantifier::Distinct);
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.set_quantifier == Some(SetQuantifier::Distinct)
    }
}

impl Source {
    pub fn table<S: ToString>(name: S) -> Self {
        Source::Table(TableRef::new(name))
    }

    pub fn join(self, kind: JoinKind, right: Source, on: Option<Expr>) -> Self {
        Source::Join(Box::new(Join {
            kind,
            left: self,
            right,
            on,
        }))
    }

    pub fn has_join(&self) -> bool {
        matches!(self, Source::Join(_))
    }

    /// The table rows are drawn from: the leftmost operand of a join tree.
    /// A raw fragment is treated as a bare table name.
    pub fn base_table(&self) -> TableRef {
        match self {
            Source::Table(table) => table.clone(),
            Source::Raw(text) => TableRef::new(text.trim()),
            Source::Join(join) => join.left.base_table(),
        }
    }
}

impl TableRef {
    pub fn new<S: ToString>(name: S) -> Self {
        TableRef {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_alias<S: ToString>(mut self, alias: S) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_schema<S: ToString>(mut self, schema: S) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn with_primary_key<S: ToString>(mut self, primary_key: S) -> Self {
        self.primary_key = Some(primary_key.to_string());
        self
    }

    pub fn with_columns<S: ToString, I: IntoIterator<Item = S>>(mut self, columns: I) -> Self {
        self.columns = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// Name columns of this table are qualified with.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn primary_key(&self) -> Option<ColumnRef> {
        (self.primary_key.as_ref()).map(|pk| ColumnRef::qualified(self.qualifier(), pk))
    }

    pub fn columns(&self) -> Vec<ColumnRef> {
        (self.columns.iter())
            .map(|c| ColumnRef::qualified(self.qualifier(), c))
            .collect()
    }
}

impl From<TableRef> for Source {
    fn from(table: TableRef) -> Self {
        Source::Table(table)
    }
}

impl From<SelectStatement> for Statement {
    fn from(select: SelectStatement) -> Self {
        Statement::Select(select)
    }
}

impl From<UpdateStatement> for Statement {
    fn from(update: UpdateStatement) -> Self {
        Statement::Update(update)
    }
}
