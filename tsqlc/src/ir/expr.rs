use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::SelectStatement;

/// Reference to a column, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new<S: ToString>(name: S) -> Self {
        ColumnRef {
            table: None,
            name: name.to_string(),
        }
    }

    pub fn qualified<T: ToString, S: ToString>(table: T, name: S) -> Self {
        ColumnRef {
            table: Some(table.to_string()),
            name: name.to_string(),
        }
    }

    pub fn asc(self) -> Ordering {
        Ordering::new(Expr::Column(self), Direction::Asc)
    }

    pub fn desc(self) -> Ordering {
        Ordering::new(Expr::Column(self), Direction::Desc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Expr {
    Column(ColumnRef),

    /// `*`, or `table.*` when qualified.
    Wildcard {
        table: Option<String>,
    },

    Literal(Literal),

    /// Literal bound to a column, quoted according to the column's type.
    Typed {
        value: Literal,
        ty: SemanticType,
    },

    Aggregate {
        func: AggregateFunc,
        args: Vec<Expr>,
        distinct: bool,
    },

    Function {
        name: String,
        args: Vec<Expr>,
    },

    Alias {
        expr: Box<Expr>,
        alias: String,
    },

    /// `DISTINCT` marker carried by a projection rather than by the core's
    /// set quantifier.
    Distinct(Box<Expr>),

    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    Not(Box<Expr>),

    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },

    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    InSubquery {
        expr: Box<Expr>,
        subquery: Box<SelectStatement>,
        negated: bool,
    },

    /// Parenthesized expression.
    Grouping(Box<Expr>),

    /// Comparison operand that must be matched case-sensitively.
    CaseSensitive(Box<Expr>),

    /// SQL text that was rendered before reaching the compiler.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Binary(Vec<u8>),
}

/// Type of the column a literal is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SemanticType {
    String,
    /// A `CHAR` / `VARCHAR` / `TEXT` column, which takes non-national literals.
    NonUnicodeString,
    Integer,
    Float,
    Boolean,
    Binary,
    Date,
    DateTime,
    Time,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AggregateFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum BinOp {
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = "<>")]
    NotEq,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "LIKE")]
    Like,
    #[strum(to_string = "NOT LIKE")]
    NotLike,
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub expr: Expr,
    pub direction: Direction,
}

impl Ordering {
    pub fn new(expr: Expr, direction: Direction) -> Self {
        Ordering { expr, direction }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Desc
    }

    /// The same ordering, in the opposite direction.
    pub fn reverse(&self) -> Self {
        Ordering {
            expr: self.expr.clone(),
            direction: self.direction.reversed(),
        }
    }
}

/// Flips the direction of every ordering, keeping their sequence.
pub fn reverse_orders(orders: &[Ordering]) -> Vec<Ordering> {
    orders.iter().map(Ordering::reverse).collect()
}

impl Expr {
    pub fn column<S: ToString>(name: S) -> Self {
        Expr::Column(ColumnRef::new(name))
    }

    pub fn qualified<T: ToString, S: ToString>(table: T, name: S) -> Self {
        Expr::Column(ColumnRef::qualified(table, name))
    }

    pub fn star() -> Self {
        Expr::Wildcard { table: None }
    }

    pub fn all_of<T: ToString>(table: T) -> Self {
        Expr::Wildcard {
            table: Some(table.to_string()),
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Integer(value))
    }

    pub fn string<S: ToString>(value: S) -> Self {
        Expr::Literal(Literal::String(value.to_string()))
    }

    pub fn raw<S: ToString>(text: S) -> Self {
        Expr::Raw(text.to_string())
    }

    pub fn count(args: Vec<Expr>) -> Self {
        Expr::Aggregate {
            func: AggregateFunc::Count,
            args,
            distinct: false,
        }
    }

    pub fn aggregate(func: AggregateFunc, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            args: vec![arg],
            distinct: false,
        }
    }

    pub fn function<S: ToString>(name: S, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.to_string(),
            args,
        }
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn eq(self, right: Expr) -> Self {
        Expr::binary(self, BinOp::Eq, right)
    }

    pub fn and(self, right: Expr) -> Self {
        Expr::binary(self, BinOp::And, right)
    }

    pub fn aliased<S: ToString>(self, alias: S) -> Self {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }

    pub fn distinct(self) -> Self {
        Expr::Distinct(Box::new(self))
    }

    pub fn asc(self) -> Ordering {
        Ordering::new(self, Direction::Asc)
    }

    pub fn desc(self) -> Ordering {
        Ordering::new(self, Direction::Desc)
    }

    /// The expression under an alias, if any.
    pub fn unaliased(&self) -> &Expr {
        match self {
            Expr::Alias { expr, .. } => expr.unaliased(),
            _ => self,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Expr::Alias { alias, .. } => Some(alias),
            _ => None,
        }
    }

    /// True for `COUNT(...)`, aliased or not.
    pub fn is_count(&self) -> bool {
        matches!(
            self.unaliased(),
            Expr::Aggregate {
                func: AggregateFunc::Count,
                ..
            }
        )
    }

    /// True for aggregates and other function calls, aliased or not.
    pub fn is_call(&self) -> bool {
        matches!(
            self.unaliased(),
            Expr::Aggregate { .. } | Expr::Function { .. }
        )
    }

    /// True when the projection carries a leading `DISTINCT` marker.
    ///
    /// `AGG(DISTINCT ...)` is not a marker: it changes the aggregate's value,
    /// not which rows are returned.
    pub fn has_distinct_marker(&self) -> bool {
        self.unaliased().is_distinct()
    }

    /// Drops the distinct marker, keeping everything else, including the
    /// quantifier of an aggregate.
    pub fn without_distinct(&self) -> Expr {
        match self {
            Expr::Distinct(inner) => inner.without_distinct(),
            Expr::Alias { expr, alias } => Expr::Alias {
                expr: Box::new(expr.without_distinct()),
                alias: alias.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Reduces a projection to the expression it is built on: aggregate
    /// wrappers and distinct markers are removed, aliases are kept.
    ///
    /// `COUNT(*)` becomes `*`.
    pub fn bare(&self) -> Expr {
        match self {
            Expr::Aggregate { args, .. } => match args.first() {
                Some(arg) => arg.bare(),
                None => Expr::star(),
            },
            Expr::Distinct(inner) => inner.bare(),
            Expr::Alias { expr, alias } => Expr::Alias {
                expr: Box::new(expr.bare()),
                alias: alias.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Table of a `table.*` projection.
    pub fn wildcard_table(&self) -> Option<&str> {
        match self.unaliased() {
            Expr::Wildcard { table } => table.as_deref(),
            Expr::Distinct(inner) => inner.wildcard_table(),
            _ => None,
        }
    }

    /// The literal `1`, which outer wrappers cannot reference without an alias.
    pub fn is_literal_one(&self) -> bool {
        match self {
            Expr::Literal(Literal::Integer(1)) => true,
            Expr::Raw(text) => text.trim() == "1",
            _ => false,
        }
    }
}

impl From<ColumnRef> for Expr {
    fn from(column: ColumnRef) -> Self {
        Expr::Column(column)
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}
