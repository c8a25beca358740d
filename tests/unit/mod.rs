pub mod common;
// Client tests - REST client against an in-process fake server, configuration loading
pub mod client;
// Statement compiler tests - end-to-end compilation of JSON and typed statements
pub mod sql;
