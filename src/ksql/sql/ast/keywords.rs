//! Closed keyword vocabularies of the ksqlDB grammar.
//!
//! Each vocabulary is a `Copy` enum whose serde name is the exact engine token, so a
//! decoded value can be emitted without any further mapping.

use std::fmt;
use std::str::FromStr;

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $token)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Engine token for this keyword
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            /// Comma-separated list of every accepted token
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        format!("Invalid {}: {}, expected one of {}", $label, s, Self::expected())
                    })
            }
        }
    };
}

keyword_enum! {
    /// Scalar column and cast types
    pub enum DataType ("simple type") {
        Boolean => "BOOLEAN",
        Integer => "INTEGER",
        BigInt => "BIGINT",
        Double => "DOUBLE",
        String => "STRING",
        Date => "DATE",
        Time => "TIME",
        Timestamp => "TIMESTAMP",
        Decimal => "DECIMAL",
        Interval => "INTERVAL",
    }
}

keyword_enum! {
    pub enum StringFunction ("string function") {
        Substring => "SUBSTRING",
        Concat => "CONCAT",
        Trim => "TRIM",
        Upper => "UPPER",
        Lower => "LOWER",
        Replace => "REPLACE",
        Split => "SPLIT",
        Len => "LEN",
        Ltrim => "LTRIM",
        Rtrim => "RTRIM",
        InitCap => "INITCAP",
        Position => "POSITION",
        SplitPart => "SPLIT_PART",
        CharLength => "CHAR_LENGTH",
        Lcase => "LCASE",
        Ucase => "UCASE",
    }
}

keyword_enum! {
    pub enum NumericFunction ("numeric function") {
        Abs => "ABS",
        Ceil => "CEIL",
        Floor => "FLOOR",
        Round => "ROUND",
        Random => "RANDOM",
        Sign => "SIGN",
        Sqrt => "SQRT",
        Exp => "EXP",
        Ln => "LN",
        Log10 => "LOG10",
        Power => "POWER",
        Mod => "MOD",
        RoundDecimal => "ROUND_DECIMAL",
        Gcd => "GCD",
        Lcm => "LCM",
    }
}

keyword_enum! {
    pub enum DateFunction ("date function") {
        DateAdd => "DATEADD",
        DateDiff => "DATEDIFF",
        DateTrunc => "DATETRUNC",
        UnixDate => "UNIX_DATE",
        UnixTimestamp => "UNIX_TIMESTAMP",
        TimestampToString => "TIMESTAMPTOSTRING",
        StringToTimestamp => "STRINGTOTIMESTAMP",
        FormatDate => "FORMAT_DATE",
        ParseTimestamp => "PARSE_TIMESTAMP",
        FormatTimestamp => "FORMAT_TIMESTAMP",
    }
}

keyword_enum! {
    pub enum AggregateFunction ("aggregate function") {
        Count => "COUNT",
        Sum => "SUM",
        Avg => "AVG",
        Min => "MIN",
        Max => "MAX",
        TopK => "TOPK",
        TopKDistinct => "TOPKDISTINCT",
        CollectList => "COLLECT_LIST",
        CollectSet => "COLLECT_SET",
        CountDistinct => "COUNT_DISTINCT",
    }
}

keyword_enum! {
    pub enum CollectionFunction ("collection function") {
        ArrayLength => "ARRAY_LENGTH",
        ArrayContains => "ARRAY_CONTAINS",
        Array => "ARRAY",
        ArrayJoin => "ARRAY_JOIN",
        ArrayDistinct => "ARRAY_DISTINCT",
        ArrayRemove => "ARRAY_REMOVE",
        ArrayPosition => "ARRAY_POSITION",
        Extract => "EXTRACT",
        AsMap => "AS_MAP",
        ToStruct => "TO_STRUCT",
        Get => "GET",
        GetField => "GET_FIELD",
        AsArray => "AS_ARRAY",
        CollectSet => "COLLECT_SET",
        CollectList => "COLLECT_LIST",
    }
}

keyword_enum! {
    /// Analytic functions that accept an `OVER` clause
    pub enum WindowFunction ("window function") {
        Lag => "LAG",
        Lead => "LEAD",
    }
}

keyword_enum! {
    pub enum ArithmeticOperator ("arithmetic operator") {
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
    }
}

keyword_enum! {
    /// Every comparison operator accepted on the wire
    pub enum ComparisonOperator ("comparison operator") {
        Equal => "=",
        NotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        IsNull => "IS NULL",
        IsNotNull => "IS NOT NULL",
        In => "IN",
        NotIn => "NOT IN",
        Like => "LIKE",
        NotLike => "NOT LIKE",
        Between => "BETWEEN",
        NotBetween => "NOT BETWEEN",
    }
}

keyword_enum! {
    /// Comparison operators taking exactly one right-hand operand
    pub enum BinaryComparisonOperator ("binary comparison operator") {
        Equal => "=",
        NotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        Like => "LIKE",
        NotLike => "NOT LIKE",
    }
}

keyword_enum! {
    pub enum MembershipOperator ("membership operator") {
        In => "IN",
        NotIn => "NOT IN",
    }
}

keyword_enum! {
    pub enum RangeOperator ("range operator") {
        Between => "BETWEEN",
        NotBetween => "NOT BETWEEN",
    }
}

keyword_enum! {
    pub enum NullCheckOperator ("null check operator") {
        IsNull => "IS NULL",
        IsNotNull => "IS NOT NULL",
    }
}

keyword_enum! {
    pub enum LogicalOperator ("logical operator") {
        And => "AND",
        Or => "OR",
        Not => "NOT",
    }
}

keyword_enum! {
    /// N-ary boolean connectives
    pub enum JunctionOperator ("junction operator") {
        And => "AND",
        Or => "OR",
    }
}

keyword_enum! {
    pub enum DataSourceType ("source type") {
        Stream => "STREAM",
        Table => "TABLE",
    }
}

keyword_enum! {
    pub enum JoinType ("join type") {
        Inner => "INNER",
        LeftOuter => "LEFT OUTER",
        FullOuter => "FULL OUTER",
    }
}

keyword_enum! {
    pub enum WindowTimeUnit ("window time unit") {
        Milliseconds => "MILLISECONDS",
        Seconds => "SECONDS",
        Minutes => "MINUTES",
        Hours => "HOURS",
        Days => "DAYS",
    }
}

keyword_enum! {
    pub enum WindowBoundary ("window boundary") {
        WindowStart => "WINDOWSTART",
        WindowEnd => "WINDOWEND",
    }
}

keyword_enum! {
    pub enum TimeExtractField ("extract field") {
        Year => "YEAR",
        Month => "MONTH",
        Day => "DAY",
        Hour => "HOUR",
        Minute => "MINUTE",
        Second => "SECOND",
        Millisecond => "MILLISECOND",
    }
}

keyword_enum! {
    pub enum SerializationFormat ("serialization format") {
        Json => "JSON",
        Avro => "AVRO",
        Protobuf => "PROTOBUF",
        Kafka => "KAFKA",
        Delimited => "DELIMITED",
    }
}

keyword_enum! {
    pub enum EmitType ("emit type") {
        Changes => "CHANGES",
        Final => "FINAL",
    }
}

keyword_enum! {
    pub enum OrderDirection ("order direction") {
        Asc => "ASC",
        Desc => "DESC",
    }
}

keyword_enum! {
    pub enum NullHandling ("null handling") {
        NullsFirst => "NULLS FIRST",
        NullsLast => "NULLS LAST",
    }
}

keyword_enum! {
    pub enum PropertyAction ("property action") {
        Set => "SET",
        Show => "SHOW",
    }
}

keyword_enum! {
    pub enum ShowType ("show type") {
        Queries => "QUERIES",
        Properties => "PROPERTIES",
        Topics => "TOPICS",
        Variables => "VARIABLES",
    }
}

impl DataSourceType {
    /// Plural form used by `LIST`
    pub fn plural(&self) -> &'static str {
        match self {
            DataSourceType::Stream => "STREAMS",
            DataSourceType::Table => "TABLES",
        }
    }
}

impl ComparisonOperator {
    /// Narrow to the single-operand form, if this operator takes one
    pub fn as_binary(&self) -> Option<BinaryComparisonOperator> {
        self.as_str().parse().ok()
    }

    pub fn as_membership(&self) -> Option<MembershipOperator> {
        self.as_str().parse().ok()
    }

    pub fn as_range(&self) -> Option<RangeOperator> {
        self.as_str().parse().ok()
    }

    pub fn as_null_check(&self) -> Option<NullCheckOperator> {
        self.as_str().parse().ok()
    }
}
