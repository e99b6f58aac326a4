//! sqlforge - programmatic SQL construction
//!
//! This crate provides a type-safe representation of SQL statements that can
//! be constructed programmatically, rendered to dialect-correct SQL text, and
//! walked a second time to collect bind-parameter values in placeholder
//! order. It is intentionally decoupled from any database driver to allow:
//!
//! - Independent testing without a running database
//! - Reuse with whatever prepared-statement API executes the result
//! - Clear separation between statement construction and execution
//!
//! # Architecture
//!
//! - [`expr`]: SQL expressions (columns, literals, bind variables, operators,
//!   EXISTS and scalar subqueries)
//! - [`stmt`]: the SELECT statement object and its clauses
//! - [`dialect`]: placeholder style and keyword casing per target engine
//! - [`render`]: the render pass ([`Render`] trait + [`RenderContext`])
//! - [`bind`]: the bind pass ([`Bind`] trait + [`BindContext`])
//! - [`params`]: the bind [`Value`] model
//! - [`query`]: the top-level [`Query`] API tying the passes together
//! - [`error`]: failure taxonomy shared by both passes
//!
//! The two traversals visit bindable leaves in the same relative order, so
//! the n-th collected value always corresponds to the n-th placeholder in
//! the rendered text. Statement trees are immutable after construction and
//! may be rendered/bound any number of times from fresh contexts.
//!
//! # Example
//!
//! ```rust
//! use sqlforge::{Expr, FromClause, Query, SelectColumn, SelectStmt, Value};
//!
//! let orders = SelectStmt::columns(vec![SelectColumn::expr(Expr::int(1))])
//!     .with_from(FromClause::table("orders"))
//!     .with_where(Expr::column("user_id").eq(Expr::qualified_column("u", "id")));
//!
//! let stmt = SelectStmt::columns(vec![SelectColumn::star()])
//!     .with_from(FromClause::table("users").with_alias("u"))
//!     .where_exists(orders)
//!     .and_where(Expr::column("active").eq(Expr::bind(true)));
//!
//! let (sql, values) = Query::new(stmt).prepare().unwrap();
//! assert!(sql.contains("exists (select 1 from \"orders\""));
//! assert_eq!(values, vec![Value::Bool(true)]);
//! ```

mod bind;
mod dialect;
mod error;
mod expr;
mod params;
mod query;
mod render;
mod stmt;

pub use bind::{bind_values, Bind, BindContext};
pub use dialect::{Dialect, KeywordCase, ParamStyle};
pub use error::{Error, Result};
pub use expr::{
    BinaryOperator, ColumnRef, ExistsOperator, Expr, Ident, Literal, OrderByExpr, OrderDirection,
    UnaryOperator,
};
pub use params::Value;
pub use query::Query;
pub use render::{render, render_expr, Render, RenderContext};
pub use stmt::{FromClause, JoinType, SelectColumn, SelectStmt};
