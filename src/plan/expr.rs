//! Expression types for the query plan

/// A column reference
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Table name or alias
    pub table: String,
    /// Column name
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Create an unqualified column reference (no table prefix)
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            name: name.into(),
        }
    }

    /// Fully qualified name: table.column
    pub fn qualified_name(&self) -> String {
        if self.table.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.table, self.name)
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Typed literal for a filter value on a column of the given numeric-ness
    ///
    /// Values that do not parse as numbers stay strings.
    pub fn for_value(value: &str, numeric: bool) -> Self {
        if numeric {
            if let Ok(i) = value.trim().parse::<i64>() {
                return Literal::Int(i);
            }
            if let Ok(f) = value.trim().parse::<f64>() {
                if f.is_finite() {
                    return Literal::Float(f);
                }
            }
        }
        Literal::String(value.to_string())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
        }
    }
}

/// Aggregate functions the compiler emits
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// `COUNT(*)`
    CountRows,
    CountDistinct,
    Sum,
    Avg,
    /// Approximate median via `APPROX_QUANTILES`
    Median,
    Min,
    Max,
    /// First non-null string ordered by a column, `NULL` when there is none
    FirstString { order_by: Column },
}

/// Scalar expressions
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference
    Column(Column),
    /// Constant literal written by the compiler (patterns, separators)
    Literal(Literal),
    /// User-supplied value; bound as a query parameter in template output
    Value(Literal),
    /// BI tool placeholder `{{name}}`
    Placeholder(String),
    /// Binary comparison (e.g., a = b)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// `expr [NOT] LIKE pattern`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
    /// IN expression (column IN (values))
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
    },
    /// AND of multiple expressions, rendered on one line
    And(Vec<Expr>),
    /// IS NULL check
    IsNull(Box<Expr>),
    /// IS NOT NULL check
    IsNotNull(Box<Expr>),
    /// CASE WHEN expression
    Case {
        /// List of (condition, result) pairs
        when_then: Vec<(Expr, Expr)>,
        /// Optional ELSE result
        else_result: Option<Box<Expr>>,
    },
    /// Scalar function call, e.g. `CONCAT(a, b)`
    Function { name: &'static str, args: Vec<Expr> },
    /// `CAST(expr AS type)`
    Cast { expr: Box<Expr>, type_name: &'static str },
    /// Aggregate call; `arg` is `None` only for `CountRows`
    Aggregate {
        func: Aggregation,
        arg: Option<Box<Expr>>,
    },
    /// Correlated `[NOT] EXISTS (SELECT 1 FROM table alias WHERE ...)`
    Exists {
        negated: bool,
        table: String,
        alias: String,
        predicates: Vec<Expr>,
    },
}

impl Expr {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column(Column::new(table, name))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::Eq,
            right: Box::new(right),
        }
    }

    pub fn not_eq(left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::NotEq,
            right: Box::new(right),
        }
    }

    pub fn function(name: &'static str, args: Vec<Expr>) -> Self {
        Expr::Function { name, args }
    }

    pub fn aggregate(func: Aggregation, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            arg: Some(Box::new(arg)),
        }
    }

    pub fn count_rows() -> Self {
        Expr::Aggregate {
            func: Aggregation::CountRows,
            arg: None,
        }
    }

    /// Whether the expression contains an aggregate call
    pub fn is_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Function { args, .. } => args.iter().any(Expr::is_aggregate),
            Expr::Cast { expr, .. } => expr.is_aggregate(),
            _ => false,
        }
    }
}
