//! Visitor over statements and expressions.
//!
//! Override the `visit_*` methods you care about and call the matching
//! `walk_*` function to keep descending.

use super::{Block, Expr, ForVar, Ident, Stmt};

pub trait Visitor<'ast>: Sized {
    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    /// A referenced identifier: a name, a member, a reused loop variable or
    /// the target of `inherited`.
    fn visit_name_ref(&mut self, _ident: &'ast Ident) {}
}

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Compound(block) => visitor.visit_block(block),
        Stmt::Assign { target, value } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        Stmt::Call(expr) => visitor.visit_expr(expr),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        Stmt::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        Stmt::Repeat { body, cond } => {
            for stmt in body {
                visitor.visit_stmt(stmt);
            }
            visitor.visit_expr(cond);
        }
        Stmt::ForTo {
            var,
            start,
            end,
            body,
            ..
        } => {
            if let ForVar::Reference(ident) = var {
                visitor.visit_name_ref(ident);
            }
            visitor.visit_expr(start);
            visitor.visit_expr(end);
            visitor.visit_stmt(body);
        }
        Stmt::ForIn {
            var,
            collection,
            body,
        } => {
            if let ForVar::Reference(ident) = var {
                visitor.visit_name_ref(ident);
            }
            visitor.visit_expr(collection);
            visitor.visit_stmt(body);
        }
        Stmt::Var { value, .. } => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Raise(expr) => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Literal(..) => {}
        Expr::Name(ident) => visitor.visit_name_ref(ident),
        Expr::Member { base, member } => {
            visitor.visit_expr(base);
            visitor.visit_name_ref(member);
        }
        Expr::Index { base, indices } => {
            visitor.visit_expr(base);
            for index in indices {
                visitor.visit_expr(index);
            }
        }
        Expr::Call { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::Unary { operand, .. } => visitor.visit_expr(operand),
        Expr::Paren(inner) => visitor.visit_expr(inner),
        Expr::Range { low, high } => {
            visitor.visit_expr(low);
            visitor.visit_expr(high);
        }
        Expr::Set(elements, _) => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        Expr::Inherited { name, .. } => {
            if let Some(name) = name {
                visitor.visit_name_ref(name);
            }
        }
    }
}

struct NameCollector<'ast> {
    found: Vec<&'ast Ident>,
}

impl<'ast> Visitor<'ast> for NameCollector<'ast> {
    fn visit_name_ref(&mut self, ident: &'ast Ident) {
        self.found.push(ident);
    }
}

/// Every identifier referenced anywhere below `stmt`, in source order of the walk.
pub fn name_references(stmt: &Stmt) -> Vec<&Ident> {
    let mut collector = NameCollector { found: Vec::new() };
    collector.visit_stmt(stmt);
    collector.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;

    #[test]
    fn test_name_references_descends_into_loops() {
        // for I := 0 to E.Count - 1 do Foo(E[I]);
        let stmt = Stmt::ForTo {
            var: ForVar::Reference(Ident::new("I", 4, 6)),
            start: Expr::int(0, 4, 11),
            end: Expr::binary(
                BinaryOperator::Subtract,
                Expr::name("E", 4, 16).dot("Count", 4, 18),
                Expr::int(1, 4, 26),
            ),
            downto: false,
            body: Box::new(Stmt::Call(
                Expr::name("Foo", 5, 4).call(vec![Expr::name("E", 5, 8).index(vec![Expr::name("I", 5, 10)])]),
            )),
        };

        let names: Vec<&str> = name_references(&stmt).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["I", "E", "Count", "Foo", "E", "I"]);
    }

    #[test]
    fn test_declared_loop_variable_is_not_a_reference() {
        let stmt = Stmt::ForIn {
            var: ForVar::Declaration {
                name: Ident::new("Item", 1, 8),
                ty: None,
            },
            collection: Expr::name("List", 1, 16),
            body: Box::new(Stmt::Compound(Block::new(1, 24, vec![]))),
        };
        let names: Vec<&str> = name_references(&stmt).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["List"]);
    }
}
