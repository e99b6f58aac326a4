//! Bind-parameter collection
//!
//! The bind pass walks the same statement tree as the render pass and
//! collects bind values in traversal order. Because both passes visit nodes
//! in identical order, the n-th collected value corresponds to the n-th
//! placeholder in the rendered SQL. No text is produced here.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::params::Value;
use crate::stmt::{FromClause, SelectColumn, SelectStmt};

/// Trait for nodes that contribute bind values.
///
/// Mirrors [`crate::render::Render`]: nested nodes are bound with the same
/// context so the value stream stays continuous across subquery boundaries.
pub trait Bind {
    /// Append this node's bind values to the given context
    fn bind(&self, ctx: &mut BindContext);
}

impl Bind for SelectStmt {
    fn bind(&self, ctx: &mut BindContext) {
        ctx.bind_select(self);
    }
}

impl Bind for Expr {
    fn bind(&self, ctx: &mut BindContext) {
        ctx.bind_expr(self);
    }
}

/// Mutable bind cursor for one statement's bind pass.
///
/// Carries the same subquery flag as the render context; the two are kept
/// consistent by each node applying identical flag transitions in both
/// passes, not by sharing state.
#[derive(Debug, Default)]
pub struct BindContext {
    values: Vec<Value>,
    in_subquery: bool,
}

impl BindContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the traversal is currently inside a nested query boundary
    pub fn subquery(&self) -> bool {
        self.in_subquery
    }

    /// Set or clear the subquery flag; same discipline as the render side
    pub fn set_subquery(&mut self, value: bool) {
        self.in_subquery = value;
    }

    /// Append a literal bind value
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Number of values collected so far
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take ownership of the collected values, verifying the subquery flag
    /// was restored by every node that set it.
    pub fn finish(self) -> Result<Vec<Value>> {
        if self.in_subquery {
            return Err(Error::UnbalancedSubqueryFlag);
        }
        Ok(self.values)
    }

    // =========================================================================
    // Traversal
    //
    // Visit order must match the render pass exactly.
    // =========================================================================

    fn bind_select(&mut self, stmt: &SelectStmt) {
        for col in &stmt.columns {
            if let SelectColumn::Expr { expr, .. } = col {
                self.bind_expr(expr);
            }
        }
        if let Some(from) = &stmt.from {
            self.bind_from(from);
        }
        if let Some(where_clause) = &stmt.where_clause {
            self.bind_expr(where_clause);
        }
        for ob in &stmt.order_by {
            self.bind_expr(&ob.expr);
        }
    }

    fn bind_from(&mut self, from: &FromClause) {
        match from {
            FromClause::Table { .. } => {}
            FromClause::Subquery { query, .. } => self.bind_select(query),
            FromClause::Join {
                left, right, on, ..
            } => {
                self.bind_from(left);
                self.bind_from(right);
                if let Some(on_expr) = on {
                    self.bind_expr(on_expr);
                }
            }
            FromClause::CrossJoin { left, right } => {
                self.bind_from(left);
                self.bind_from(right);
            }
        }
    }

    fn bind_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(_) | Expr::Literal(_) => {}

            Expr::BindParam(value) => self.push(value.clone()),

            Expr::BinaryOp { left, right, .. } => {
                self.bind_expr(left);
                self.bind_expr(right);
            }

            Expr::UnaryOp { expr, .. } => self.bind_expr(expr),

            Expr::IsNull { expr, .. } => self.bind_expr(expr),

            Expr::InList { expr, list, .. } => {
                self.bind_expr(expr);
                for item in list {
                    self.bind_expr(item);
                }
            }

            Expr::Between {
                expr, low, high, ..
            } => {
                self.bind_expr(expr);
                self.bind_expr(low);
                self.bind_expr(high);
            }

            Expr::Exists { query, .. } => self.bind_exists(query),

            Expr::Subquery(query) => self.bind_select(query),

            Expr::Nested(inner) => self.bind_expr(inner),

            #[cfg(test)]
            Expr::Raw(_) | Expr::SubqueryProbe => {}
        }
    }

    /// Bind the inner query of `[NOT] EXISTS`.
    ///
    /// Structurally identical to the render side: only the first subquery
    /// boundary toggles the flag, and the flag reads the same after this
    /// returns as it did on entry.
    fn bind_exists(&mut self, query: &SelectStmt) {
        if self.in_subquery {
            self.bind_select(query);
        } else {
            self.set_subquery(true);
            self.bind_select(query);
            self.set_subquery(false);
        }
    }
}

/// Collect the bind values of a SELECT statement in placeholder order
pub fn bind_values(stmt: &SelectStmt) -> Result<Vec<Value>> {
    let mut ctx = BindContext::new();
    stmt.bind(&mut ctx);
    ctx.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::FromClause;

    fn orders_for_user(user_param: Value) -> SelectStmt {
        SelectStmt::columns(vec![SelectColumn::expr(Expr::int(1))])
            .with_from(FromClause::table("orders"))
            .with_where(Expr::column("user_id").eq(Expr::BindParam(user_param)))
    }

    #[test]
    fn test_bind_order_matches_clause_order() {
        let stmt = SelectStmt::columns(vec![SelectColumn::expr(Expr::bind(10i64))])
            .with_from(FromClause::table("t"))
            .with_where(
                Expr::column("a")
                    .eq(Expr::bind("first"))
                    .and(Expr::column("b").eq(Expr::bind("second"))),
            );

        let values = bind_values(&stmt).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(10),
                Value::String("first".into()),
                Value::String("second".into()),
            ]
        );
    }

    #[test]
    fn test_bind_recurses_into_exists() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()])
            .with_from(FromClause::table("users"))
            .with_where(
                Expr::exists(orders_for_user(Value::Integer(7)))
                    .and(Expr::column("active").eq(Expr::bind(true))),
            );

        let values = bind_values(&stmt).unwrap();
        assert_eq!(values, vec![Value::Integer(7), Value::Bool(true)]);
    }

    #[test]
    fn test_exists_bind_flag_neutral_from_both_entry_states() {
        let expr = Expr::exists(orders_for_user(Value::Integer(1)));
        for entry in [false, true] {
            let mut ctx = BindContext::new();
            ctx.set_subquery(entry);
            expr.bind(&mut ctx);
            assert_eq!(ctx.subquery(), entry, "flag changed for entry={}", entry);
            assert_eq!(ctx.len(), 1);
        }
    }

    #[test]
    fn test_finish_detects_dangling_flag() {
        let mut ctx = BindContext::new();
        ctx.set_subquery(true);
        assert_eq!(ctx.finish(), Err(Error::UnbalancedSubqueryFlag));
    }

    #[test]
    fn test_bind_join_and_in_list() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()])
            .with_from(FromClause::table("users").with_alias("u").inner_join(
                FromClause::table("orders").with_alias("o"),
                Expr::qualified_column("o", "total").eq(Expr::bind(100i64)),
            ))
            .with_where(Expr::InList {
                expr: Box::new(Expr::qualified_column("u", "status")),
                list: vec![Expr::bind("active"), Expr::bind("pending")],
                negated: false,
            });

        let values = bind_values(&stmt).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(100),
                Value::String("active".into()),
                Value::String("pending".into()),
            ]
        );
    }
}
