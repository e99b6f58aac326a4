//! SQL expression types
//!
//! This module defines the expression node model: a closed set of tagged
//! variants covering columns, literals, bind variables, operator
//! combinations, and subquery-wrapping conditions. Nodes are immutable after
//! construction; rendering and binding are separate traversals defined in
//! [`crate::render`] and [`crate::bind`].

use crate::params::Value;
use crate::stmt::SelectStmt;

/// A quoted SQL identifier (table name, column name, etc.)
///
/// Identifiers are always quoted when rendered to prevent SQL injection
/// and handle special characters correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(pub String);

impl Ident {
    #[inline]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a column, optionally qualified with a table alias
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Table alias (e.g., "t" in "t.id")
    pub table_alias: Option<Ident>,
    /// Column name
    pub column: Ident,
}

impl ColumnRef {
    pub fn new(column: impl Into<Ident>) -> Self {
        Self {
            table_alias: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<Ident>, column: impl Into<Ident>) -> Self {
        Self {
            table_alias: Some(table.into()),
            column: column.into(),
        }
    }
}

/// SQL literal values, rendered inline with proper quoting
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// SQL NULL
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// String literal (will be properly quoted)
    String(String),
}

impl Literal {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // String matching
    Like,

    // Logical
    And,
    Or,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOperator {
    /// Get the SQL representation of this operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "like",
            Self::And => "and",
            Self::Or => "or",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
}

impl UnaryOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
        }
    }
}

/// EXISTS / NOT EXISTS operator tag
///
/// Fixed at construction of the wrapping [`Expr::Exists`] node. The keyword
/// text is a pure function of the tag; casing is applied by the render
/// context according to the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistsOperator {
    Exists,
    NotExists,
}

impl ExistsOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::NotExists => "not exists",
        }
    }
}

/// ORDER BY expression component
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDirection>,
}

impl OrderByExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            direction: None,
        }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Some(OrderDirection::Asc),
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Some(OrderDirection::Desc),
        }
    }
}

/// ORDER BY direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The main expression enum encompassing all SQL expression types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: table.column or just column
    Column(ColumnRef),

    /// Literal value, rendered inline
    Literal(Literal),

    /// Bind variable. Renders as a dialect placeholder; the render pass
    /// never sees the value, the bind pass collects it in traversal order.
    BindParam(Value),

    /// Binary operation: expr op expr
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op (expr)
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// expr IN (values) - for a list
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `[NOT] EXISTS (subquery)`
    ///
    /// The inner query is owned and present by construction; the operator
    /// tag is fixed. Rendering and binding of this node transition the
    /// context's subquery flag when entered from the top level and leave
    /// the flag exactly as found on exit.
    Exists {
        query: Box<SelectStmt>,
        operator: ExistsOperator,
    },

    /// Scalar subquery: (SELECT ...)
    Subquery(Box<SelectStmt>),

    /// Parenthesized expression (for explicit grouping)
    Nested(Box<Expr>),

    /// Raw SQL string - only available in tests.
    ///
    /// This bypasses quoting and escaping; never use outside test code.
    #[cfg(test)]
    Raw(String),

    /// Test-only probe that renders a different marker depending on the
    /// context's subquery flag. Stands in for dialect rules that format
    /// output differently at the first nesting level.
    #[cfg(test)]
    SubqueryProbe,
}

impl Expr {
    // Convenience constructors

    /// Create a column reference
    pub fn column(name: impl Into<Ident>) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    /// Create a qualified column reference (table.column)
    pub fn qualified_column(table: impl Into<Ident>, column: impl Into<Ident>) -> Self {
        Self::Column(ColumnRef::qualified(table, column))
    }

    /// Create a NULL literal
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Create a boolean literal
    pub fn bool(b: bool) -> Self {
        Self::Literal(Literal::Bool(b))
    }

    /// Create an integer literal
    pub fn int(n: i64) -> Self {
        Self::Literal(Literal::Integer(n))
    }

    /// Create a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Literal::String(s.into()))
    }

    /// Create a bind variable
    pub fn bind(value: impl Into<Value>) -> Self {
        Self::BindParam(value.into())
    }

    /// Create a binary operation
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Self::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a NOT expression
    pub fn not(expr: Expr) -> Self {
        Self::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(expr),
        }
    }

    /// Create an IS NULL expression
    pub fn is_null(expr: Expr) -> Self {
        Self::IsNull {
            expr: Box::new(expr),
            negated: false,
        }
    }

    /// Create an IS NOT NULL expression
    pub fn is_not_null(expr: Expr) -> Self {
        Self::IsNull {
            expr: Box::new(expr),
            negated: true,
        }
    }

    /// Create an EXISTS condition wrapping a subquery
    pub fn exists(query: SelectStmt) -> Self {
        Self::Exists {
            query: Box::new(query),
            operator: ExistsOperator::Exists,
        }
    }

    /// Create a NOT EXISTS condition wrapping a subquery
    pub fn not_exists(query: SelectStmt) -> Self {
        Self::Exists {
            query: Box::new(query),
            operator: ExistsOperator::NotExists,
        }
    }

    /// Create a scalar subquery expression
    pub fn subquery(query: SelectStmt) -> Self {
        Self::Subquery(Box::new(query))
    }

    /// Wrap in parentheses
    pub fn nested(self) -> Self {
        Self::Nested(Box::new(self))
    }

    /// Combine with AND
    pub fn and(self, other: Expr) -> Self {
        Self::binary(self, BinaryOperator::And, other)
    }

    /// Combine with OR
    pub fn or(self, other: Expr) -> Self {
        Self::binary(self, BinaryOperator::Or, other)
    }

    /// Check equality
    pub fn eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOperator::Eq, other)
    }

    /// Create raw SQL - only available in tests.
    #[cfg(test)]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::new("id");
        assert_eq!(col.column.as_str(), "id");
        assert!(col.table_alias.is_none());

        let col = ColumnRef::qualified("users", "id");
        assert_eq!(col.table_alias.unwrap().as_str(), "users");
        assert_eq!(col.column.as_str(), "id");
    }

    #[test]
    fn test_expr_constructors() {
        let expr = Expr::qualified_column("t", "id");
        match expr {
            Expr::Column(c) => {
                assert_eq!(c.table_alias.unwrap().as_str(), "t");
                assert_eq!(c.column.as_str(), "id");
            }
            _ => panic!("Expected Column"),
        }

        let expr = Expr::bind(42i64);
        match expr {
            Expr::BindParam(Value::Integer(n)) => assert_eq!(n, 42),
            _ => panic!("Expected BindParam"),
        }
    }

    #[test]
    fn test_exists_constructors() {
        let e = Expr::exists(SelectStmt::new());
        match e {
            Expr::Exists { operator, .. } => assert_eq!(operator, ExistsOperator::Exists),
            _ => panic!("Expected Exists"),
        }

        let e = Expr::not_exists(SelectStmt::new());
        match e {
            Expr::Exists { operator, .. } => assert_eq!(operator, ExistsOperator::NotExists),
            _ => panic!("Expected Exists"),
        }
    }

    #[test]
    fn test_operator_keywords() {
        assert_eq!(ExistsOperator::Exists.as_sql(), "exists");
        assert_eq!(ExistsOperator::NotExists.as_sql(), "not exists");
        assert_eq!(BinaryOperator::Eq.as_sql(), "=");
        assert_eq!(BinaryOperator::And.as_sql(), "and");
        assert_eq!(UnaryOperator::Not.as_sql(), "not");
    }

    #[test]
    fn test_binary_op() {
        let expr = Expr::qualified_column("t", "id").eq(Expr::int(1));
        match expr {
            Expr::BinaryOp { op, .. } => assert_eq!(op, BinaryOperator::Eq),
            _ => panic!("Expected BinaryOp"),
        }
    }
}
