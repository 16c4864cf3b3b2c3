//! Statements arriving as JSON, as a query builder in another process sends them.
use insta::assert_snapshot;
use tsqlc::{json, Options};

#[test]
fn test_compile_from_json() {
    let statement = json::to_statement(
        r#"{"Select": {
            "cores": [{
                "projections": [{"Wildcard": {"table": "people"}}],
                "source": {"Table": {"name": "people", "primary_key": "id", "columns": []}},
                "wheres": [],
                "groups": []
            }],
            "orders": [],
            "limit": {"Literal": {"Integer": 5}},
            "offset": {"Literal": {"Integer": 10}},
            "lock": "Default"
        }}"#,
    )
    .unwrap();

    assert_snapshot!(tsqlc::compile(&statement, &Options::default()).unwrap(), @"SELECT TOP (5) [__rnt].* FROM (SELECT ROW_NUMBER() OVER (ORDER BY [people].[id] ASC) AS [__rn], [people].* FROM [people] WITH(HOLDLOCK, ROWLOCK)) AS [__rnt] WHERE [__rnt].[__rn] > (10) ORDER BY [__rnt].[__rn] ASC");

    let json = json::from_statement(&statement).unwrap();
    similar_asserts::assert_eq!(json::to_statement(&json).unwrap(), statement);
}

#[test]
fn test_bad_json() {
    let error = json::to_statement(r#"{"Delete": {}}"#).unwrap_err();
    assert_eq!(error.code, Some("E0002"));
    assert!(error.to_string().contains("unknown variant `Delete`"));
}
