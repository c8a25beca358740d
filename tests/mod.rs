// Test Module Organization

// Unit tests - Fast tests with no external dependencies
pub mod unit;

// Property tests - Generated statement trees checked against the compiler contract
pub mod property;
