// SELECT compilation end to end

use crate::unit::common::{column, compile, count_star, literal, stream_from, table_from};
use ksqlgen::ksql::sql::ast::{
    BinaryComparisonOperator, Comparison, EmitType, Expression, FromClause, SelectColumn,
    SelectQuery, SimpleSelect,
};
use ksqlgen::KsqlStatement;

#[test]
fn test_simple_select_from_json() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{}}}],"from":{},"emit":"CHANGES"}}"#,
        column("id"),
        stream_from("s")
    );
    assert_eq!(compile(&json).unwrap(), "SELECT id FROM s EMIT CHANGES;");
}

#[test]
fn test_typed_and_json_inputs_agree() {
    let mut select = SimpleSelect::new(
        vec![SelectColumn::new(Expression::column("id")).with_alias("order_id")],
        FromClause::stream("orders"),
    );
    select.where_clause = Some(
        Comparison::binary(
            Expression::column("amount"),
            BinaryComparisonOperator::GreaterThanOrEqual,
            Expression::literal(100i64),
        )
        .into(),
    );
    select.emit = Some(EmitType::Changes);
    let typed = ksqlgen::compile(&KsqlStatement::Select(SelectQuery::Simple(select))).unwrap();

    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{},"alias":"order_id"}}],"from":{},
            "where":{{"type":"COMPARISON","operator":">=","left":{},"right":{}}},"emit":"CHANGES"}}"#,
        column("id"),
        stream_from("orders"),
        column("amount"),
        literal("100")
    );
    assert_eq!(compile(&json).unwrap(), typed);
    assert_eq!(
        typed,
        "SELECT id AS order_id FROM orders WHERE amount >= 100 EMIT CHANGES;"
    );
}

#[test]
fn test_windowed_select_emits_clauses_in_engine_order() {
    let json = format!(
        r#"{{"type":"COLUMN",
            "columns":[
                {{"expression":{region}}},
                {{"expression":{count},"alias":"total"}},
                {{"expression":{{"type":"TRANSFORMATION","value":{{"type":"WINDOW_BOUNDARY","boundary":"WINDOWSTART"}}}}}}
            ],
            "from":{from},
            "where":{{"type":"COMPARISON","operator":">","left":{amount},"right":{zero}}},
            "groupBy":{{
                "columns":[{{"expression":{region}}}],
                "window":{{"spec":{{"type":"TUMBLING","size":{{"value":5,"unit":"MINUTES"}}}}}},
                "having":{{"type":"AGGREGATE","function":"COUNT","operator":">","right":{five}}}
            }},
            "orderBy":{{"columns":[{{"expression":{region},"direction":"ASC"}}]}},
            "limit":10,
            "emit":"FINAL"}}"#,
        region = column("region"),
        count = count_star(),
        from = stream_from("orders"),
        amount = column("amount"),
        zero = literal("0"),
        five = literal("5"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT region, COUNT(*) AS total, WINDOWSTART FROM orders WHERE amount > 0 \
         WINDOW TUMBLING (SIZE 5 MINUTES) GROUP BY region HAVING COUNT(*) > 5 \
         ORDER BY region ASC LIMIT 10 EMIT FINAL;"
    );
}

#[test]
fn test_select_and_group_by_partition_both_render() {
    let json = format!(
        r#"{{"type":"COLUMN",
            "columns":[{{"expression":{region}}},{{"expression":{count}}}],
            "from":{from},
            "groupBy":{{"columns":[{{"expression":{region}}}],"partitionBy":{{"columns":[{city}]}}}},
            "partitionBy":{{"columns":[{region}]}}}}"#,
        region = column("region"),
        city = column("city"),
        count = count_star(),
        from = stream_from("orders"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT region, COUNT(*) FROM orders PARTITION BY region GROUP BY region PARTITION BY city;"
    );
}

#[test]
fn test_empty_in_list_renders_empty_parentheses() {
    let json = format!(
        r#"{{"type":"STAR","from":{},
            "where":{{"type":"COMPARISON","operator":"IN","left":{},"right":[]}}}}"#,
        stream_from("s"),
        column("col")
    );
    assert_eq!(compile(&json).unwrap(), "SELECT * FROM s WHERE col IN ();");
}

#[test]
fn test_simple_select_rejects_window_boundary() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{{"type":"TRANSFORMATION",
            "value":{{"type":"WINDOW_BOUNDARY","boundary":"WINDOWEND"}}}}}}],"from":{}}}"#,
        stream_from("s")
    );
    assert_eq!(
        compile(&json).unwrap_err().to_string(),
        "Invalid select column: WINDOW_BOUNDARY transformation is not allowed in a simple select"
    );
}

#[test]
fn test_stream_table_join_with_subquery_source() {
    let json = format!(
        r#"{{"type":"STAR",
            "from":{{"sourceType":"STREAM",
                "source":{{"type":"SUBQUERY","alias":"o","query":{{"type":"STAR","from":{inner}}}}},
                "joins":[{{"type":"LEFT OUTER",
                    "source":{{"name":"customers","alias":"c","sourceType":"TABLE"}},
                    "conditions":[{{"leftField":"o.customer_id","rightField":"c.id"}}]}}]}},
            "emit":"CHANGES"}}"#,
        inner = stream_from("orders"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT * FROM (SELECT * FROM orders) AS o LEFT OUTER JOIN customers AS c ON o.customer_id = c.id EMIT CHANGES;"
    );
}

#[test]
fn test_table_select_with_aggregate_window_reference() {
    let json = format!(
        r#"{{"type":"COLUMN",
            "columns":[
                {{"expression":{user}}},
                {{"expression":{{"type":"TRANSFORMATION","value":{{"type":"AGGREGATE","function":"SUM",
                    "parameters":[{amount}],"window":{{"name":"w"}},"alias":"spent"}}}}}}
            ],
            "from":{from},
            "groupBy":{{"columns":[{{"expression":{user}}}]}}}}"#,
        user = column("user_id"),
        amount = column("amount"),
        from = table_from("payments"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT user_id, SUM(amount) WINDOW w AS spent FROM payments GROUP BY user_id;"
    );
}

#[test]
fn test_window_function_with_over_clause() {
    let json = format!(
        r#"{{"type":"COLUMN",
            "columns":[
                {{"expression":{symbol}}},
                {{"expression":{{"type":"TRANSFORMATION","value":{{"type":"WINDOW","function":"LAG",
                    "parameters":[{price},{one}],
                    "over":{{"partitionBy":[{symbol}],"orderBy":[{{"expression":{ts}}}]}}}}}}}}
            ],
            "from":{from},
            "groupBy":{{"columns":[{{"expression":{symbol}}}]}}}}"#,
        symbol = column("symbol"),
        price = column("price"),
        ts = column("ts"),
        one = literal("1"),
        from = stream_from("trades"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT symbol, LAG(price, 1) OVER (PARTITION BY symbol ORDER BY ts) FROM trades GROUP BY symbol;"
    );
}

#[test]
fn test_hopping_window_advance_larger_than_size() {
    let json = format!(
        r#"{{"type":"COLUMN",
            "columns":[{{"expression":{region}}},{{"expression":{count}}}],
            "from":{from},
            "groupBy":{{
                "columns":[{{"expression":{region}}}],
                "window":{{"spec":{{"type":"HOPPING",
                    "size":{{"value":1,"unit":"MINUTES"}},
                    "advance":{{"value":5,"unit":"MINUTES"}}}}}}
            }}}}"#,
        region = column("region"),
        count = count_star(),
        from = stream_from("orders"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "SELECT region, COUNT(*) FROM orders WINDOW HOPPING (SIZE 1 MINUTES, ADVANCE BY 5 MINUTES) GROUP BY region;"
    );
}
