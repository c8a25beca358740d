/*!
# Compile Error Handling

Every compiler in this crate reports problems as a [`CompileError`] value. Errors fall into
three categories:

- **Shape errors**: the input does not decode into the closed data model at all (unknown
  discriminant, operator used with the wrong operand form, missing required field).
- **Semantic errors**: a node decodes fine but breaks a local rule such as a non-positive
  window duration, an empty struct or a malformed identifier.
- **Aggregate errors**: several independent children of a list-shaped node failed. Their
  messages are merged into one error so a single compile attempt reports all of them.

## Examples

```rust
use ksqlgen::ksql::sql::error::CompileError;

let error = CompileError::aggregate(
    Some("Invalid struct type"),
    vec![
        CompileError::semantic("Struct must have at least one field"),
        CompileError::semantic("Invalid window duration: 0 SECONDS"),
    ],
);
assert_eq!(
    error.to_string(),
    "Invalid struct type: Struct must have at least one field, Invalid window duration: 0 SECONDS"
);
```
*/

/// Errors raised while validating or rendering a statement
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Input does not conform to the data model
    #[error("{message}")]
    Shape { message: String },

    /// A node-local rule was violated
    #[error("{message}")]
    Semantic { message: String },

    /// Several children failed independently
    #[error("{}", join_aggregate(.context, .errors))]
    Aggregate {
        context: Option<String>,
        errors: Vec<CompileError>,
    },
}

/// Result alias used by every compiler
pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    pub fn shape(message: impl Into<String>) -> Self {
        CompileError::Shape {
            message: message.into(),
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        CompileError::Semantic {
            message: message.into(),
        }
    }

    pub fn aggregate(context: Option<&str>, errors: Vec<CompileError>) -> Self {
        CompileError::Aggregate {
            context: context.map(str::to_string),
            errors,
        }
    }

    /// Leaf messages of this error, depth first.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CompileError::Shape { message } | CompileError::Semantic { message } => {
                vec![message.clone()]
            }
            CompileError::Aggregate { errors, .. } => {
                errors.iter().flat_map(CompileError::messages).collect()
            }
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, CompileError::Shape { .. })
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::shape(err.to_string())
    }
}

fn join_aggregate(context: &Option<String>, errors: &[CompileError]) -> String {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match context {
        Some(context) => format!("{}: {}", context, joined),
        None => joined,
    }
}
