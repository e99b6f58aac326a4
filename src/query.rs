//! Top-level statement API
//!
//! A [`Query`] owns an immutable statement tree plus the dialect it targets,
//! and runs the render and bind passes with fresh contexts on demand. The
//! tree is validated before any SQL is emitted: a structurally broken tree
//! fails fast instead of rendering malformed SQL.

use crate::bind::{Bind, BindContext};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::params::Value;
use crate::render::{Render, RenderContext};
use crate::stmt::{FromClause, SelectColumn, SelectStmt};

/// A renderable, bindable SQL statement
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    stmt: SelectStmt,
    dialect: Dialect,
}

impl Query {
    /// Wrap a statement tree, targeting the default dialect
    pub fn new(stmt: SelectStmt) -> Self {
        Self {
            stmt,
            dialect: Dialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn stmt(&self) -> &SelectStmt {
        &self.stmt
    }

    /// Render the statement to compact SQL text
    pub fn to_sql(&self) -> Result<String> {
        self.render_with(RenderContext::new(self.dialect))
    }

    /// Render the statement to pretty-printed SQL text
    pub fn to_sql_pretty(&self) -> Result<String> {
        self.render_with(RenderContext::pretty(self.dialect))
    }

    fn render_with(&self, mut ctx: RenderContext) -> Result<String> {
        validate_select(&self.stmt, "statement")?;
        self.stmt.render(&mut ctx);
        let sql = ctx.finish()?;
        log::debug!("rendered sql: {}", sql);
        Ok(sql)
    }

    /// Collect the statement's bind values in placeholder order
    pub fn bind_values(&self) -> Result<Vec<Value>> {
        validate_select(&self.stmt, "statement")?;
        let mut ctx = BindContext::new();
        self.stmt.bind(&mut ctx);
        let values = ctx.finish()?;
        log::trace!("collected {} bind value(s)", values.len());
        Ok(values)
    }

    /// Render and bind in one call, cross-checking that the render pass
    /// emitted exactly one placeholder per bound value.
    pub fn prepare(&self) -> Result<(String, Vec<Value>)> {
        validate_select(&self.stmt, "statement")?;

        let mut render_ctx = RenderContext::new(self.dialect);
        self.stmt.render(&mut render_ctx);
        let placeholders = render_ctx.param_count();
        let sql = render_ctx.finish()?;

        let mut bind_ctx = BindContext::new();
        self.stmt.bind(&mut bind_ctx);
        let values = bind_ctx.finish()?;

        if placeholders != values.len() {
            return Err(Error::BindMismatch {
                placeholders,
                values: values.len(),
            });
        }

        log::debug!("prepared sql with {} bind value(s): {}", values.len(), sql);
        Ok((sql, values))
    }
}

impl From<SelectStmt> for Query {
    fn from(stmt: SelectStmt) -> Self {
        Self::new(stmt)
    }
}

// =========================================================================
// Structural validation
// =========================================================================

/// Walk the tree and reject statements that would render to malformed SQL.
/// The `context` string identifies the offending node in the error message.
fn validate_select(stmt: &SelectStmt, context: &str) -> Result<()> {
    if stmt.columns.is_empty() {
        return Err(Error::MalformedTree(format!(
            "{} selects no columns",
            context
        )));
    }
    for col in &stmt.columns {
        if let SelectColumn::Expr { expr, .. } = col {
            validate_expr(expr)?;
        }
    }
    if let Some(from) = &stmt.from {
        validate_from(from)?;
    }
    if let Some(where_clause) = &stmt.where_clause {
        validate_expr(where_clause)?;
    }
    for ob in &stmt.order_by {
        validate_expr(&ob.expr)?;
    }
    Ok(())
}

fn validate_from(from: &FromClause) -> Result<()> {
    match from {
        FromClause::Table { .. } => Ok(()),
        FromClause::Subquery { query, .. } => validate_select(query, "from-clause subquery"),
        FromClause::Join {
            left, right, on, ..
        } => {
            validate_from(left)?;
            validate_from(right)?;
            if let Some(on_expr) = on {
                validate_expr(on_expr)?;
            }
            Ok(())
        }
        FromClause::CrossJoin { left, right } => {
            validate_from(left)?;
            validate_from(right)
        }
    }
}

fn validate_expr(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Column(_) | Expr::Literal(_) | Expr::BindParam(_) => Ok(()),
        Expr::BinaryOp { left, right, .. } => {
            validate_expr(left)?;
            validate_expr(right)
        }
        Expr::UnaryOp { expr, .. } => validate_expr(expr),
        Expr::IsNull { expr, .. } => validate_expr(expr),
        Expr::InList { expr, list, .. } => {
            validate_expr(expr)?;
            if list.is_empty() {
                return Err(Error::MalformedTree("in-list has no elements".into()));
            }
            for item in list {
                validate_expr(item)?;
            }
            Ok(())
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            validate_expr(expr)?;
            validate_expr(low)?;
            validate_expr(high)
        }
        Expr::Exists { query, .. } => validate_select(query, "exists subquery"),
        Expr::Subquery(query) => validate_select(query, "scalar subquery"),
        Expr::Nested(inner) => validate_expr(inner),
        #[cfg(test)]
        Expr::Raw(_) | Expr::SubqueryProbe => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_one_from(table: &str) -> SelectStmt {
        SelectStmt::columns(vec![SelectColumn::expr(Expr::int(1))])
            .with_from(FromClause::table(table))
    }

    #[test]
    fn test_to_sql_and_bind_values() {
        let query = Query::new(
            SelectStmt::columns(vec![SelectColumn::star()])
                .with_from(FromClause::table("users"))
                .with_where(Expr::column("id").eq(Expr::bind(5i64))),
        );

        assert_eq!(
            query.to_sql().unwrap(),
            "select * from \"users\" where \"id\" = $1"
        );
        assert_eq!(query.bind_values().unwrap(), vec![Value::Integer(5)]);
    }

    #[test]
    fn test_prepare_cross_checks_counts() {
        let query = Query::new(
            SelectStmt::columns(vec![SelectColumn::star()])
                .with_from(FromClause::table("users"))
                .with_where(
                    Expr::column("a")
                        .eq(Expr::bind(1i64))
                        .and(Expr::exists(
                            select_one_from("orders")
                                .and_where(Expr::column("total").eq(Expr::bind(2i64))),
                        )),
                ),
        );

        let (sql, values) = query.prepare().unwrap();
        assert_eq!(sql.matches('$').count(), values.len());
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_empty_subquery_fails_fast() {
        let query = Query::new(
            SelectStmt::columns(vec![SelectColumn::star()])
                .with_from(FromClause::table("users"))
                .where_exists(SelectStmt::new()),
        );

        match query.to_sql() {
            Err(Error::MalformedTree(msg)) => {
                assert!(msg.contains("exists subquery"), "message was: {}", msg)
            }
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_in_list_fails_fast() {
        let query = Query::new(
            SelectStmt::columns(vec![SelectColumn::star()])
                .with_from(FromClause::table("users"))
                .with_where(Expr::InList {
                    expr: Box::new(Expr::column("id")),
                    list: vec![],
                    negated: false,
                }),
        );
        assert!(matches!(query.to_sql(), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn test_dialect_selection() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()])
            .with_from(FromClause::table("t"))
            .with_where(Expr::column("id").eq(Expr::bind(1i64)));

        let pg = Query::new(stmt.clone());
        assert!(pg.to_sql().unwrap().contains("$1"));

        let lite = Query::new(stmt).with_dialect(Dialect::Sqlite);
        assert!(lite.to_sql().unwrap().contains('?'));
    }
}
