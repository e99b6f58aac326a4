//! SQL statement types
//!
//! This module defines the SELECT statement object that serves as the inner
//! query of subquery-wrapping conditions and as the root of a rendered
//! statement. The full staged fluent surface of a DSL lives above this
//! crate; here statements are plain structs with builder-style methods.

use crate::expr::{Expr, Ident, OrderByExpr};

/// SELECT statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStmt {
    /// SELECT columns
    pub columns: Vec<SelectColumn>,
    /// FROM clause
    pub from: Option<FromClause>,
    /// WHERE clause
    pub where_clause: Option<Expr>,
    /// ORDER BY clause
    pub order_by: Vec<OrderByExpr>,
    /// LIMIT
    pub limit: Option<u64>,
    /// OFFSET
    pub offset: Option<u64>,
}

impl SelectStmt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simple SELECT with columns
    pub fn columns(columns: Vec<SelectColumn>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the WHERE clause, replacing any existing condition
    pub fn with_where(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }

    /// AND a condition onto the WHERE clause
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    /// Add a WHERE EXISTS condition wrapping the given subquery
    pub fn where_exists(self, query: SelectStmt) -> Self {
        self.and_where(Expr::exists(query))
    }

    /// Add a WHERE NOT EXISTS condition wrapping the given subquery
    pub fn where_not_exists(self, query: SelectStmt) -> Self {
        self.and_where(Expr::not_exists(query))
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByExpr>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A column in a SELECT clause
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    /// An expression with optional alias: expr AS alias
    Expr { expr: Expr, alias: Option<Ident> },
    /// All columns: *
    Star,
    /// All columns from a table: table.*
    QualifiedStar { table: Ident },
}

impl SelectColumn {
    /// Create an expression column without alias
    pub fn expr(expr: Expr) -> Self {
        Self::Expr { expr, alias: None }
    }

    /// Create an expression column with alias
    pub fn expr_as(expr: Expr, alias: impl Into<Ident>) -> Self {
        Self::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Create a star (SELECT *)
    pub fn star() -> Self {
        Self::Star
    }

    /// Create a qualified star (SELECT table.*)
    pub fn qualified_star(table: impl Into<Ident>) -> Self {
        Self::QualifiedStar {
            table: table.into(),
        }
    }
}

/// FROM clause
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// Simple table reference
    Table {
        schema: Option<Ident>,
        name: Ident,
        alias: Option<Ident>,
    },
    /// Subquery
    Subquery {
        query: Box<SelectStmt>,
        alias: Ident,
    },
    /// JOIN clause
    Join {
        left: Box<FromClause>,
        join_type: JoinType,
        right: Box<FromClause>,
        on: Option<Expr>,
    },
    /// CROSS JOIN
    CrossJoin {
        left: Box<FromClause>,
        right: Box<FromClause>,
    },
}

impl FromClause {
    /// Create a simple table reference
    pub fn table(name: impl Into<Ident>) -> Self {
        Self::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Create a schema-qualified table reference
    pub fn qualified_table(schema: impl Into<Ident>, name: impl Into<Ident>) -> Self {
        Self::Table {
            schema: Some(schema.into()),
            name: name.into(),
            alias: None,
        }
    }

    /// Create a subquery source
    pub fn subquery(query: SelectStmt, alias: impl Into<Ident>) -> Self {
        Self::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    /// Add an alias to this FROM clause
    pub fn with_alias(self, alias: impl Into<Ident>) -> Self {
        match self {
            Self::Table { schema, name, .. } => Self::Table {
                schema,
                name,
                alias: Some(alias.into()),
            },
            _ => self,
        }
    }

    /// Create a LEFT JOIN
    pub fn left_join(self, right: FromClause, on: Expr) -> Self {
        Self::Join {
            left: Box::new(self),
            join_type: JoinType::Left,
            right: Box::new(right),
            on: Some(on),
        }
    }

    /// Create an INNER JOIN
    pub fn inner_join(self, right: FromClause, on: Expr) -> Self {
        Self::Join {
            left: Box::new(self),
            join_type: JoinType::Inner,
            right: Box::new(right),
            on: Some(on),
        }
    }

    /// Create a CROSS JOIN
    pub fn cross_join(self, right: FromClause) -> Self {
        Self::CrossJoin {
            left: Box::new(self),
            right: Box::new(right),
        }
    }
}

/// JOIN type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full join",
        }
    }
}
