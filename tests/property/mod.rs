// Property tests for the compiler's fail-closed contract

use ksqlgen::ksql::sql::ast::*;
use ksqlgen::{compile, validate, KsqlStatement};
use proptest::prelude::*;

fn arb_ident() -> BoxedStrategy<String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,6}")
        .expect("valid regex")
        .boxed()
}

fn arb_unit() -> BoxedStrategy<WindowTimeUnit> {
    prop::sample::select(WindowTimeUnit::ALL.to_vec()).boxed()
}

fn arb_operator() -> BoxedStrategy<BinaryComparisonOperator> {
    prop_oneof![
        Just(BinaryComparisonOperator::Equal),
        Just(BinaryComparisonOperator::NotEqual),
        Just(BinaryComparisonOperator::LessThan),
        Just(BinaryComparisonOperator::LessThanOrEqual),
        Just(BinaryComparisonOperator::GreaterThan),
        Just(BinaryComparisonOperator::GreaterThanOrEqual),
    ]
    .boxed()
}

/// Comparison trees of bounded depth over integer literals.
fn arb_condition(depth: u32) -> BoxedStrategy<WhereCondition> {
    let leaf = (arb_ident(), arb_operator(), any::<i64>())
        .prop_map(|(column, operator, value)| {
            Comparison::binary(Expression::column(column), operator, Expression::literal(value)).into()
        })
        .boxed();
    if depth == 0 {
        return leaf;
    }
    prop_oneof![
        3 => leaf,
        1 => proptest::collection::vec(arb_condition(depth - 1), 2..4).prop_map(WhereCondition::and),
        1 => proptest::collection::vec(arb_condition(depth - 1), 2..4).prop_map(WhereCondition::or),
        1 => arb_condition(depth - 1).prop_map(WhereCondition::negate),
    ]
    .boxed()
}

fn windowed_select(size: WindowDuration) -> KsqlStatement {
    let count: Expression =
        TransformationKind::Aggregate(AggregateCall::new(AggregateFunction::Count, vec![])).into();
    let group_by = WindowedGroupBy {
        columns: vec![GroupByColumn::column("region")],
        having: None,
        partition_by: None,
        window: WindowBinding::Definition(WindowDefinition {
            spec: WindowSpec::Tumbling(TumblingWindow::new(size)),
            boundaries: None,
        }),
    };
    KsqlStatement::Select(SelectQuery::Windowed(WindowedSelect::new(
        vec![
            SelectColumn::new(Expression::column("region")),
            SelectColumn::new(count),
        ],
        FromClause::stream("orders"),
        group_by,
    )))
}

proptest! {
    #[test]
    fn window_size_must_be_positive(value in -1_000i64..1_000, unit in arb_unit()) {
        let statement = windowed_select(WindowDuration::new(value, unit));
        let compiled = compile(&statement);

        prop_assert_eq!(compiled.is_ok(), value > 0);
        prop_assert_eq!(validate(&statement).is_ok(), compiled.is_ok());
        match compiled {
            Ok(sql) => prop_assert_eq!(
                sql,
                format!(
                    "SELECT region, COUNT(*) FROM orders WINDOW TUMBLING (SIZE {} {}) GROUP BY region;",
                    value, unit
                )
            ),
            Err(e) => prop_assert!(e.to_string().contains("Invalid window duration"), "{}", e),
        }
    }

    #[test]
    fn terminate_accepts_only_plain_query_ids(query_id in "[ -~]{0,12}") {
        let plain = !query_id.is_empty()
            && query_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        let compiled = compile(&KsqlStatement::Terminate(TerminateQuery::new(query_id.clone())));

        prop_assert_eq!(compiled.is_ok(), plain);
        if let Ok(sql) = compiled {
            prop_assert_eq!(sql, format!("TERMINATE {};", query_id));
        }
    }

    #[test]
    fn where_trees_compile_deterministically(condition in arb_condition(3), source in arb_ident()) {
        let mut select = SelectStar::new(FromClause::stream(source.clone()));
        select.where_clause = Some(condition);
        let statement = KsqlStatement::Select(SelectQuery::Star(select));

        let first = compile(&statement);
        prop_assert!(first.is_ok(), "{:?}", first);
        prop_assert_eq!(&first, &compile(&statement));

        let sql = first.unwrap();
        let prefix = format!("SELECT * FROM {} WHERE ", source);
        prop_assert!(sql.starts_with(&prefix), "{}", sql);
        prop_assert!(sql.ends_with(';'));
        prop_assert!(!sql.contains('\n'));
    }
}
