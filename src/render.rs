//! SQL string rendering
//!
//! This module converts statement trees to SQL strings. It is the only place
//! in the crate where SQL text is constructed.
//!
//! # Architecture
//!
//! The rendering system is built around two key components:
//!
//! - [`Render`] trait: Implemented by all nodes to define how they render to SQL
//! - [`RenderContext`]: The mutable cursor that handles output buffering,
//!   keyword casing, placeholder numbering, the nested-subquery flag, and
//!   indentation locking
//!
//! The render pass and the bind pass ([`crate::bind`]) walk the same tree in
//! the same order; a bind variable emits a placeholder here and a value there.
//!
//! # Safety
//!
//! All identifiers are properly quoted. All string literals are properly
//! escaped.

use crate::dialect::{Dialect, KeywordCase, ParamStyle};
use crate::error::{Error, Result};
use crate::expr::{Expr, Ident, Literal, OrderByExpr};
use crate::stmt::{FromClause, SelectColumn, SelectStmt};
use std::fmt::Write;

// =============================================================================
// Render Trait
// =============================================================================

/// Trait for nodes that can be rendered to SQL.
///
/// Each node type defines its own rendering logic while sharing the common
/// [`RenderContext`] infrastructure. Nested nodes are rendered with the
/// *same* context, so output accumulates into one buffer and placeholder
/// numbering stays continuous across subquery boundaries.
pub trait Render {
    /// Render this node into the given context
    fn render(&self, ctx: &mut RenderContext);
}

impl Render for SelectStmt {
    fn render(&self, ctx: &mut RenderContext) {
        ctx.render_select(self);
    }
}

impl Render for Expr {
    fn render(&self, ctx: &mut RenderContext) {
        ctx.render_expr(self);
    }
}

impl Render for Literal {
    fn render(&self, ctx: &mut RenderContext) {
        ctx.render_literal(self);
    }
}

impl Render for Ident {
    fn render(&self, ctx: &mut RenderContext) {
        ctx.write_ident(self);
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Default buffer capacity for rendered statements
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Mutable render cursor for one statement's render pass.
///
/// Not safe for concurrent use; the statement tree itself is immutable and
/// may be rendered from any number of independent contexts.
pub struct RenderContext {
    output: String,
    dialect: Dialect,
    pretty: bool,
    indent_level: usize,
    /// Saved indentation levels, one per open lock region
    indent_locks: Vec<usize>,
    in_subquery: bool,
    /// 1-indexed number of the next placeholder to emit
    next_param: usize,
}

impl RenderContext {
    /// Create a new context with compact output
    pub fn new(dialect: Dialect) -> Self {
        Self {
            output: String::with_capacity(DEFAULT_BUFFER_CAPACITY),
            dialect,
            pretty: false,
            indent_level: 0,
            indent_locks: Vec::new(),
            in_subquery: false,
            next_param: 1,
        }
    }

    /// Create a new context with pretty-printed output
    pub fn pretty(dialect: Dialect) -> Self {
        Self {
            pretty: true,
            ..Self::new(dialect)
        }
    }

    /// Whether the traversal is currently inside a nested query boundary
    pub fn subquery(&self) -> bool {
        self.in_subquery
    }

    /// Set or clear the subquery flag.
    ///
    /// Only the node that transitions from top-level to first-level-nested
    /// rendering calls this; it must restore the flag before returning so
    /// sibling nodes observe the state unchanged.
    pub fn set_subquery(&mut self, value: bool) {
        self.in_subquery = value;
    }

    /// Number of placeholders emitted so far
    pub fn param_count(&self) -> usize {
        self.next_param - 1
    }

    /// Take ownership of the rendered SQL string without invariant checks
    pub fn into_sql(self) -> String {
        self.output
    }

    /// Take ownership of the rendered SQL string, verifying that every
    /// indentation lock was released and the subquery flag was restored.
    pub fn finish(self) -> Result<String> {
        if !self.indent_locks.is_empty() {
            return Err(Error::UnbalancedIndentLock {
                held: self.indent_locks.len(),
            });
        }
        if self.in_subquery {
            return Err(Error::UnbalancedSubqueryFlag);
        }
        Ok(self.output)
    }

    // =========================================================================
    // Statement rendering
    // =========================================================================

    fn render_select(&mut self, stmt: &SelectStmt) {
        self.keyword("select");
        self.sql(" ");
        self.render_select_columns(&stmt.columns);

        if let Some(from) = &stmt.from {
            self.newline();
            self.keyword("from");
            self.sql(" ");
            self.render_from(from);
        }

        if let Some(where_clause) = &stmt.where_clause {
            self.newline();
            self.keyword("where");
            self.sql(" ");
            self.render_expr(where_clause);
        }

        if !stmt.order_by.is_empty() {
            self.newline();
            self.keyword("order by");
            self.sql(" ");
            self.render_order_by(&stmt.order_by);
        }

        if let Some(limit) = stmt.limit {
            self.newline();
            self.keyword("limit");
            write!(self.output, " {}", limit).unwrap();
        }

        if let Some(offset) = stmt.offset {
            self.newline();
            self.keyword("offset");
            write!(self.output, " {}", offset).unwrap();
        }
    }

    // =========================================================================
    // FROM clause rendering
    // =========================================================================

    fn render_from(&mut self, from: &FromClause) {
        match from {
            FromClause::Table {
                schema,
                name,
                alias,
            } => {
                if let Some(schema) = schema {
                    self.write_ident(schema);
                    self.sql(".");
                }
                self.write_ident(name);
                if let Some(alias) = alias {
                    self.sql(" ");
                    self.write_ident(alias);
                }
            }
            FromClause::Subquery { query, alias } => {
                self.render_subquery_block(query);
                self.sql(" ");
                self.write_ident(alias);
            }
            FromClause::Join {
                left,
                join_type,
                right,
                on,
            } => {
                self.render_from(left);
                self.newline();
                self.keyword(join_type.as_sql());
                self.sql(" ");
                self.render_from(right);
                if let Some(on_expr) = on {
                    self.sql(" ");
                    self.keyword("on");
                    self.sql(" ");
                    self.render_expr(on_expr);
                }
            }
            FromClause::CrossJoin { left, right } => {
                self.render_from(left);
                self.sql(" ");
                self.keyword("cross join");
                self.sql(" ");
                self.render_from(right);
            }
        }
    }

    // =========================================================================
    // Expression rendering
    // =========================================================================

    fn render_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(col) => {
                if let Some(table) = &col.table_alias {
                    self.write_ident(table);
                    self.sql(".");
                }
                self.write_ident(&col.column);
            }

            Expr::Literal(lit) => self.render_literal(lit),

            Expr::BindParam(_) => self.placeholder(),

            Expr::BinaryOp { left, op, right } => {
                self.render_expr(left);
                self.sql(" ");
                self.keyword(op.as_sql());
                self.sql(" ");
                self.render_expr(right);
            }

            Expr::UnaryOp { op, expr } => {
                self.keyword(op.as_sql());
                self.sql("(");
                self.render_expr(expr);
                self.sql(")");
            }

            Expr::IsNull { expr, negated } => {
                self.render_expr(expr);
                self.sql(" ");
                if *negated {
                    self.keyword("is not null");
                } else {
                    self.keyword("is null");
                }
            }

            Expr::InList {
                expr,
                list,
                negated,
            } => {
                self.render_expr(expr);
                self.sql(" ");
                if *negated {
                    self.keyword("not in");
                } else {
                    self.keyword("in");
                }
                self.sql(" (");
                self.render_expr_list(list);
                self.sql(")");
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.render_expr(expr);
                self.sql(" ");
                if *negated {
                    self.keyword("not between");
                } else {
                    self.keyword("between");
                }
                self.sql(" ");
                self.render_expr(low);
                self.sql(" ");
                self.keyword("and");
                self.sql(" ");
                self.render_expr(high);
            }

            Expr::Exists { query, operator } => {
                self.render_exists(query, *operator);
            }

            Expr::Subquery(query) => {
                self.render_subquery_block(query);
            }

            Expr::Nested(inner) => {
                self.sql("(");
                self.render_expr(inner);
                self.sql(")");
            }

            // Raw SQL - only available in tests
            #[cfg(test)]
            Expr::Raw(sql) => {
                self.sql(sql);
            }

            #[cfg(test)]
            Expr::SubqueryProbe => {
                if self.in_subquery {
                    self.sql("/*nested*/");
                } else {
                    self.sql("/*top*/");
                }
            }
        }
    }

    /// Render `[NOT] EXISTS (subquery)`.
    ///
    /// Only the first subquery boundary toggles the flag; an exists-node
    /// that is already inside a subquery leaves it untouched. Either way
    /// the flag reads the same after this returns as it did on entry, so
    /// sibling nodes see an unchanged context. The inner query's own line
    /// breaks are bracketed by an indentation lock so they cannot perturb
    /// the ambient indentation.
    fn render_exists(&mut self, query: &SelectStmt, operator: crate::expr::ExistsOperator) {
        if self.in_subquery {
            self.keyword(operator.as_sql());
            self.sql(" (");
            self.format_indent_lock_start();
            self.render_select(query);
            self.format_indent_lock_end();
            self.sql(")");
        } else {
            self.keyword(operator.as_sql());
            self.sql(" (");
            self.set_subquery(true);
            self.format_indent_lock_start();
            self.render_select(query);
            self.format_indent_lock_end();
            self.set_subquery(false);
            self.sql(")");
        }
    }

    /// Render a parenthesized subquery as an indented block, the way CTE
    /// bodies are conventionally formatted. In compact mode the newlines
    /// collapse to spaces.
    fn render_subquery_block(&mut self, query: &SelectStmt) {
        self.sql("(");
        self.indent();
        self.newline();
        self.render_select(query);
        self.dedent();
        self.newline();
        self.sql(")");
    }

    fn render_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.keyword("null"),
            Literal::Bool(b) => self.keyword(if *b { "true" } else { "false" }),
            Literal::Integer(n) => write!(self.output, "{}", n).unwrap(),
            Literal::Float(f) => write!(self.output, "{}", f).unwrap(),
            Literal::String(s) => self.write_literal(s),
        }
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn render_select_columns(&mut self, columns: &[SelectColumn]) {
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.sql(", ");
            }
            match col {
                SelectColumn::Expr { expr, alias } => {
                    self.render_expr(expr);
                    if let Some(alias) = alias {
                        self.sql(" ");
                        self.keyword("as");
                        self.sql(" ");
                        self.write_ident(alias);
                    }
                }
                SelectColumn::Star => self.sql("*"),
                SelectColumn::QualifiedStar { table } => {
                    self.write_ident(table);
                    self.sql(".*");
                }
            }
        }
    }

    fn render_expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.sql(", ");
            }
            self.render_expr(expr);
        }
    }

    fn render_order_by(&mut self, order_by: &[OrderByExpr]) {
        for (i, ob) in order_by.iter().enumerate() {
            if i > 0 {
                self.sql(", ");
            }
            self.render_expr(&ob.expr);
            if let Some(dir) = &ob.direction {
                self.sql(" ");
                self.keyword(dir.as_sql());
            }
        }
    }

    // =========================================================================
    // Low-level output methods
    // =========================================================================

    /// Append raw SQL text verbatim
    pub fn sql(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Append a SQL keyword, cased according to the dialect
    pub fn keyword(&mut self, kw: &str) {
        match self.dialect.keyword_case() {
            KeywordCase::Lower => self.output.push_str(kw),
            KeywordCase::Upper => {
                for c in kw.chars() {
                    self.output.extend(c.to_uppercase());
                }
            }
        }
    }

    /// Emit a bind placeholder and advance the placeholder counter
    pub fn placeholder(&mut self) {
        match self.dialect.param_style() {
            ParamStyle::Numbered => write!(self.output, "${}", self.next_param).unwrap(),
            ParamStyle::Positional => self.output.push('?'),
        }
        self.next_param += 1;
    }

    fn write_ident(&mut self, ident: &Ident) {
        // Always quote identifiers to prevent SQL injection and handle special chars
        self.output.push('"');
        // Escape any double quotes in the identifier by doubling them
        for c in ident.as_str().chars() {
            if c == '"' {
                self.output.push('"');
            }
            self.output.push(c);
        }
        self.output.push('"');
    }

    fn write_literal(&mut self, s: &str) {
        // Use dollar quoting for strings that might contain special characters
        if s.contains('\'') || s.contains('\\') {
            self.output.push_str("$__$");
            self.output.push_str(s);
            self.output.push_str("$__$");
        } else {
            self.output.push('\'');
            self.output.push_str(s);
            self.output.push('\'');
        }
    }

    // =========================================================================
    // Formatting state
    // =========================================================================

    /// Open a region whose indentation must not be perturbed by nested
    /// formatting. While at least one lock is held, line breaks collapse to
    /// spaces. Every start must be matched by exactly one end before the
    /// region's caller returns.
    pub fn format_indent_lock_start(&mut self) {
        self.indent_locks.push(self.indent_level);
    }

    /// Close the innermost locked region, restoring the indentation level
    /// captured when it was opened.
    pub fn format_indent_lock_end(&mut self) {
        debug_assert!(
            !self.indent_locks.is_empty(),
            "indentation lock released without matching acquire"
        );
        if let Some(level) = self.indent_locks.pop() {
            self.indent_level = level;
        }
    }

    fn newline(&mut self) {
        if self.pretty && self.indent_locks.is_empty() {
            self.output.push('\n');
            for _ in 0..self.indent_level {
                self.output.push_str("    ");
            }
        } else {
            self.output.push(' ');
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

// =========================================================================
// Convenience functions
// =========================================================================

/// Render a SELECT statement to a compact Postgres-flavored SQL string
pub fn render(stmt: &SelectStmt) -> String {
    let mut ctx = RenderContext::new(Dialect::Postgres);
    stmt.render(&mut ctx);
    ctx.into_sql()
}

/// Render just an expression
pub fn render_expr(expr: &Expr) -> String {
    let mut ctx = RenderContext::new(Dialect::Postgres);
    expr.render(&mut ctx);
    ctx.into_sql()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::FromClause;

    fn select_one_from(table: &str) -> SelectStmt {
        SelectStmt::columns(vec![SelectColumn::expr(Expr::int(1))])
            .with_from(FromClause::table(table))
    }

    #[test]
    fn test_render_simple_select() {
        let stmt =
            SelectStmt::columns(vec![SelectColumn::star()]).with_from(FromClause::table("users"));

        let sql = render(&stmt);
        assert_eq!(sql, "select * from \"users\"");
    }

    #[test]
    fn test_render_select_with_where() {
        let stmt = SelectStmt::columns(vec![
            SelectColumn::expr(Expr::qualified_column("t", "id")),
            SelectColumn::expr(Expr::qualified_column("t", "name")),
        ])
        .with_from(FromClause::table("users").with_alias("t"))
        .with_where(Expr::qualified_column("t", "active").eq(Expr::bool(true)));

        let sql = render(&stmt);
        assert!(sql.contains("\"t\".\"id\", \"t\".\"name\""));
        assert!(sql.contains("where \"t\".\"active\" = true"));
    }

    #[test]
    fn test_render_exists_top_level() {
        let expr = Expr::exists(select_one_from("t"));
        assert_eq!(render_expr(&expr), "exists (select 1 from \"t\")");
    }

    #[test]
    fn test_render_not_exists_top_level() {
        let expr = Expr::not_exists(select_one_from("t"));
        assert_eq!(render_expr(&expr), "not exists (select 1 from \"t\")");
    }

    #[test]
    fn test_exists_flag_neutral_from_both_entry_states() {
        let expr = Expr::exists(select_one_from("t"));
        for entry in [false, true] {
            let mut ctx = RenderContext::new(Dialect::Postgres);
            ctx.set_subquery(entry);
            expr.render(&mut ctx);
            assert_eq!(ctx.subquery(), entry, "flag changed for entry={}", entry);
        }
    }

    #[test]
    fn test_subquery_probe_observes_flag() {
        let mut ctx = RenderContext::new(Dialect::Postgres);
        Expr::SubqueryProbe.render(&mut ctx);
        assert_eq!(ctx.into_sql(), "/*top*/");

        let mut ctx = RenderContext::new(Dialect::Postgres);
        ctx.set_subquery(true);
        Expr::SubqueryProbe.render(&mut ctx);
        ctx.set_subquery(false);
        assert_eq!(ctx.finish().unwrap(), "/*nested*/");
    }

    #[test]
    fn test_placeholder_styles() {
        let expr = Expr::column("id")
            .eq(Expr::bind(1i64))
            .and(Expr::column("name").eq(Expr::bind("x")));

        let mut ctx = RenderContext::new(Dialect::Postgres);
        expr.render(&mut ctx);
        assert_eq!(ctx.param_count(), 2);
        assert_eq!(ctx.into_sql(), "\"id\" = $1 and \"name\" = $2");

        let mut ctx = RenderContext::new(Dialect::Sqlite);
        expr.render(&mut ctx);
        assert_eq!(ctx.into_sql(), "\"id\" = ? and \"name\" = ?");
    }

    #[test]
    fn test_keyword_case() {
        let expr = Expr::exists(select_one_from("t"));
        let mut ctx = RenderContext::new(Dialect::Mysql);
        expr.render(&mut ctx);
        assert_eq!(ctx.into_sql(), "EXISTS (SELECT 1 FROM \"t\")");
    }

    #[test]
    fn test_render_in_list_and_between() {
        let expr = Expr::InList {
            expr: Box::new(Expr::column("status")),
            list: vec![Expr::string("active"), Expr::string("pending")],
            negated: false,
        };
        assert_eq!(
            render_expr(&expr),
            "\"status\" in ('active', 'pending')"
        );

        let expr = Expr::Between {
            expr: Box::new(Expr::column("age")),
            low: Box::new(Expr::int(18)),
            high: Box::new(Expr::int(65)),
            negated: true,
        };
        assert_eq!(render_expr(&expr), "\"age\" not between 18 and 65");
    }

    #[test]
    fn test_render_is_null() {
        assert_eq!(
            render_expr(&Expr::is_null(Expr::column("deleted_at"))),
            "\"deleted_at\" is null"
        );
        assert_eq!(
            render_expr(&Expr::is_not_null(Expr::column("deleted_at"))),
            "\"deleted_at\" is not null"
        );
    }

    #[test]
    fn test_render_order_limit_offset() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()])
            .with_from(FromClause::table("users"))
            .with_order_by(vec![crate::expr::OrderByExpr::desc(Expr::column(
                "created_at",
            ))])
            .with_limit(10)
            .with_offset(20);
        let sql = render(&stmt);
        assert!(sql.contains("order by \"created_at\" desc"));
        assert!(sql.contains("limit 10"));
        assert!(sql.contains("offset 20"));
    }

    #[test]
    fn test_render_join() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()]).with_from(
            FromClause::table("users").with_alias("u").left_join(
                FromClause::table("orders").with_alias("o"),
                Expr::qualified_column("u", "id").eq(Expr::qualified_column("o", "user_id")),
            ),
        );
        let sql = render(&stmt);
        assert!(sql.contains("left join \"orders\" \"o\" on"));
    }

    #[test]
    fn test_ident_quoting() {
        let ident = Ident::new("user\"name");
        let mut ctx = RenderContext::new(Dialect::Postgres);
        ident.render(&mut ctx);
        assert_eq!(ctx.into_sql(), "\"user\"\"name\"");
    }

    #[test]
    fn test_raw_passthrough() {
        let expr = Expr::column("updated_at").eq(Expr::raw("now()"));
        assert_eq!(render_expr(&expr), "\"updated_at\" = now()");
    }

    #[test]
    fn test_string_literal_with_quotes() {
        let sql = render_expr(&Expr::string("it's a test"));
        assert!(sql.contains("$__$"));
    }

    #[test]
    fn test_finish_detects_held_lock() {
        let mut ctx = RenderContext::new(Dialect::Postgres);
        ctx.format_indent_lock_start();
        assert_eq!(
            ctx.finish(),
            Err(Error::UnbalancedIndentLock { held: 1 })
        );
    }

    #[test]
    fn test_finish_detects_dangling_subquery_flag() {
        let mut ctx = RenderContext::new(Dialect::Postgres);
        ctx.set_subquery(true);
        assert_eq!(ctx.finish(), Err(Error::UnbalancedSubqueryFlag));
    }

    #[test]
    fn test_pretty_inner_query_stays_on_one_line() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()])
            .with_from(FromClause::table("users"))
            .where_exists(select_one_from("orders"));

        let mut ctx = RenderContext::pretty(Dialect::Postgres);
        stmt.render(&mut ctx);
        let sql = ctx.finish().unwrap();

        // Outer clauses break lines; the locked inner query does not.
        assert!(sql.contains("\nwhere exists (select 1 from \"orders\")"));
    }

    #[test]
    fn test_pretty_subquery_block_indents() {
        let stmt = SelectStmt::columns(vec![SelectColumn::star()]).with_from(
            FromClause::subquery(select_one_from("orders"), "o"),
        );
        let mut ctx = RenderContext::pretty(Dialect::Postgres);
        stmt.render(&mut ctx);
        let sql = ctx.finish().unwrap();
        assert!(sql.contains("(\n    select 1"));
    }
}
