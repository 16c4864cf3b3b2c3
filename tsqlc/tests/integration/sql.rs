//! Simple tests for "this statement creates this SQL" go here.
use insta::assert_snapshot;
use rstest::rstest;
use tsqlc::ir::{
    AggregateFunc, ColumnRef, Expr, JoinKind, Literal, SelectCore, SelectStatement, SemanticType,
    Source, Statement, TableRef, UpdateStatement,
};
use tsqlc::{Options, UNBOUNDED_LIMIT};

fn compile<S: Into<Statement>>(statement: S) -> String {
    tsqlc::compile(&statement.into(), &Options::default()).unwrap()
}

fn people() -> TableRef {
    TableRef::new("people").with_primary_key("id")
}

#[test]
fn test_limit_and_offset() {
    let select = SelectStatement::new(SelectCore::new(
        vec![Expr::all_of("people")],
        Source::table("people"),
    ))
    .with_orders(vec![Expr::qualified("people", "name").asc()])
    .with_limit(10)
    .with_offset(20);

    assert_snapshot!(compile(select), @"SELECT TOP (10) [__rnt].* FROM (SELECT ROW_NUMBER() OVER (ORDER BY [people].[name] ASC) AS [__rn], [people].* FROM [people]) AS [__rnt] WHERE [__rnt].[__rn] > (20) ORDER BY [__rnt].[__rn] ASC");
}

#[test]
fn test_count_with_limit_and_offset() {
    let select = SelectStatement::new(SelectCore::new(
        vec![Expr::count(vec![Expr::qualified("people", "id")])],
        people().into(),
    ))
    .with_limit(20)
    .with_offset(10);

    assert_snapshot!(compile(select), @"SELECT COUNT([count]) AS [count_id] FROM (SELECT TOP (30) ROW_NUMBER() OVER (ORDER BY [people].[id] ASC) AS [__rn], 1 AS [count] FROM [people]) AS [__rnt] WHERE [__rnt].[__rn] > (10)");
}

#[test]
fn test_ordered_update() {
    let update = UpdateStatement {
        relation: TableRef::new("t"),
        values: vec![(ColumnRef::new("x"), Expr::int(1))],
        wheres: vec![],
        orders: vec![Expr::qualified("t", "y").asc()],
        limit: None,
        key: Some(ColumnRef::qualified("t", "id")),
    };

    assert_snapshot!(compile(update), @"UPDATE [t] SET [x] = 1 WHERE [t].[id] IN (SELECT TOP (9223372036854775807) [t].[id] FROM [t] ORDER BY [t].[y] ASC)");
    assert_eq!(UNBOUNDED_LIMIT.to_string(), "9223372036854775807");
}

#[test]
fn test_distinct_ordered_by_other_column() {
    let select = SelectStatement::new(SelectCore::new(
        vec![Expr::qualified("people", "name").distinct()],
        Source::table("people"),
    ))
    .with_orders(vec![Expr::qualified("people", "age").desc()])
    .with_limit(5);

    assert_snapshot!(compile(select), @"SELECT DISTINCT TOP (5) [name], [__order] FROM (SELECT [people].[name], DENSE_RANK() OVER (ORDER BY [people].[age] DESC) AS [__order], ROW_NUMBER() OVER (PARTITION BY [people].[name] ORDER BY [people].[age] DESC) AS [__joined_row_num] FROM [people]) AS [__sq] WHERE [__joined_row_num] = 1 ORDER BY [__order]");
}

#[test]
fn test_synthetic_name_collision() {
    let select = SelectStatement::new(SelectCore::new(
        vec![Expr::qualified("people", "__rn"), Expr::qualified("people", "name")],
        Source::table("people"),
    ))
    .with_orders(vec![Expr::qualified("people", "name").asc()])
    .with_limit(2)
    .with_offset(4);

    assert_snapshot!(compile(select), @"SELECT TOP (2) [__rnt].* FROM (SELECT ROW_NUMBER() OVER (ORDER BY [people].[name] ASC) AS [__rn_1], [people].[__rn], [people].[name] FROM [people]) AS [__rnt] WHERE [__rnt].[__rn_1] > (4) ORDER BY [__rnt].[__rn_1] ASC");
}

#[test]
fn test_duplicate_orders() {
    let select = SelectStatement::new(SelectCore::new(
        vec![Expr::all_of("people")],
        Source::table("people"),
    ))
    .with_orders(vec![
        Expr::qualified("people", "name").asc(),
        Expr::qualified("people", "name").asc(),
    ])
    .with_offset(1);

    assert_snapshot!(compile(select), @"SELECT [__rnt].* FROM (SELECT ROW_NUMBER() OVER (ORDER BY [people].[name] ASC) AS [__rn], [people].* FROM [people]) AS [__rnt] WHERE [__rnt].[__rn] > (1) ORDER BY [__rnt].[__rn] ASC");
}

#[test]
fn test_uncorrelated_join() {
    let source = Source::table("people")
        .join(
            JoinKind::LeftOuter,
            Source::table("pets"),
            Some(Expr::qualified("pets", "owner_id").eq(Expr::qualified("people", "id"))),
        )
        .join(
            JoinKind::Fragment,
            Source::Raw("INNER JOIN [pets] ON [pets].[kind] = [people].[kind]".to_string()),
            None,
        );
    let select = SelectStatement::new(SelectCore::new(vec![Expr::all_of("people")], source))
        .with_orders(vec![Expr::qualified("people", "name").asc()])
        .with_offset(1);

    assert_snapshot!(compile(select), @"SELECT [__rnt].* FROM (SELECT ROW_NUMBER() OVER (ORDER BY [people].[name] ASC) AS [__rn], [people].* FROM [people] LEFT OUTER JOIN [pets] ON [pets].[owner_id] = [people].[id] INNER JOIN [pets] AS [pets_crltd] ON [pets_crltd].[kind] = [people].[kind]) AS [__rnt] WHERE [__rnt].[__rn] > (1) ORDER BY [__rnt].[__rn] ASC");
}

#[test]
fn test_compile_is_pure() {
    let statement: Statement = SelectStatement::new(SelectCore::new(
        vec![Expr::qualified("people", "name").distinct()],
        Source::table("people"),
    ))
    .with_orders(vec![
        Expr::qualified("people", "age").desc(),
        Expr::qualified("people", "age").desc(),
    ])
    .with_limit(5)
    .with_offset(5)
    .into();
    let before = statement.clone();

    let first = tsqlc::compile(&statement, &Options::default()).unwrap();
    let second = tsqlc::compile(&statement, &Options::default()).unwrap();

    similar_asserts::assert_eq!(first, second);
    similar_asserts::assert_eq!(statement, before);
}

#[test]
fn test_collation() {
    let select = SelectStatement::new(
        SelectCore::new(vec![Expr::all_of("people")], Source::table("people")).with_wheres(vec![
            Expr::CaseSensitive(Box::new(Expr::qualified("people", "name"))).eq(Expr::Typed {
                value: Literal::String("Ann".to_string()),
                ty: SemanticType::String,
            }),
        ]),
    );
    let options = Options::default().with_collation("Latin1_General_BIN");

    assert_snapshot!(tsqlc::compile(&select.into(), &options).unwrap(), @"SELECT [people].* FROM [people] WHERE [people].[name] COLLATE Latin1_General_BIN = N'Ann'");
}

#[rstest]
#[case::plain(
    SelectStatement::new(SelectCore::new(vec![Expr::qualified("people", "name")], people().into()))
        .with_limit(3),
    "SELECT TOP (3) [people].[name] FROM [people]"
)]
#[case::distinct_quantifier(
    SelectStatement::new(SelectCore::new(vec![Expr::qualified("people", "name")], people().into()).distinct())
        .with_limit(3),
    "SELECT DISTINCT TOP (3) [people].[name] FROM [people]"
)]
#[case::distinct_offset(
    SelectStatement::new(SelectCore::new(vec![Expr::qualified("people", "name")], people().into()).distinct())
        .with_offset(3),
    "SELECT [__rnt].* FROM (SELECT DISTINCT DENSE_RANK() OVER (ORDER BY [people].[name] ASC) AS [__rn], [people].[name] FROM [people]) AS [__rnt] WHERE [__rnt].[__rn] > (3) ORDER BY [__rnt].[__rn] ASC"
)]
#[case::distinct_tied_orders(
    SelectStatement::new(
        SelectCore::new(
            vec![Expr::qualified("people", "name"), Expr::qualified("people", "age")],
            people().into(),
        )
        .distinct(),
    )
    .with_orders(vec![Expr::qualified("people", "age").asc()])
    .with_limit(2)
    .with_offset(1),
    "SELECT TOP (2) [__rnt].* FROM (SELECT DISTINCT DENSE_RANK() OVER (ORDER BY [people].[age] ASC, [people].[name] ASC) AS [__rn], [people].[name], [people].[age] FROM [people]) AS [__rnt] WHERE [__rnt].[__rn] > (1) ORDER BY [__rnt].[__rn] ASC"
)]
#[case::distinct_star_limit(
    SelectStatement::new(SelectCore::new(vec![Expr::all_of("people").distinct()], people().into()))
        .with_limit(5),
    "SELECT DISTINCT TOP (5) [people].* FROM [people]"
)]
#[case::count_distinct(
    SelectStatement::new(
        SelectCore::new(
            vec![Expr::Aggregate {
                func: AggregateFunc::Count,
                args: vec![Expr::qualified("people", "name")],
                distinct: true,
            }
            .aliased("n")],
            people().into(),
        )
        .with_groups(vec![Expr::qualified("people", "city")]),
    )
    .with_orders(vec![Expr::qualified("people", "city").asc()]),
    "SELECT COUNT(DISTINCT [people].[name]) AS [n] FROM [people] GROUP BY [people].[city] ORDER BY [people].[city] ASC"
)]
#[case::schema_and_alias(
    SelectStatement::new(SelectCore::new(
        vec![Expr::qualified("p", "name")],
        TableRef::new("people").with_schema("dbo").with_alias("p").into(),
    )),
    "SELECT [p].[name] FROM [dbo].[people] AS [p]"
)]
fn test_select(#[case] select: SelectStatement, #[case] expected: &str) {
    similar_asserts::assert_eq!(compile(select), expected);
}
