// Client configuration loading
pub mod config_test;

// REST client against a fake ksqlDB server
pub mod ksqldb_client_test;
