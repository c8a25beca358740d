// Statement compiler tests

// SELECT compilation: clause order, select variants, joins, windows
pub mod select_test;

// DDL/DML and administrative statements
pub mod statement_test;

// JSON input contract: shape errors and discriminants
pub mod json_input_test;

// Aggregated diagnostics across nested nodes
pub mod error_reporting_test;
