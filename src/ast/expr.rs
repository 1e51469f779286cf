//! Statements and expressions.

use smol_str::SmolStr;

use super::{Ident, TypeExpr};
use crate::base::LineCol;

/// Binary operators as they appear in expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    In,
    Is,
    As,
    Add,
    Subtract,
    Multiply,
    Divide,
    Div,
    Mod,
    Shl,
    Shr,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 20] = [
        BinaryOperator::And,
        BinaryOperator::Or,
        BinaryOperator::Xor,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::LessThan,
        BinaryOperator::LessThanEqual,
        BinaryOperator::GreaterThan,
        BinaryOperator::GreaterThanEqual,
        BinaryOperator::In,
        BinaryOperator::Is,
        BinaryOperator::As,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Div,
        BinaryOperator::Mod,
        BinaryOperator::Shl,
        BinaryOperator::Shr,
    ];

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanEqual
        )
    }
}

/// Unary operators as they appear in expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Plus,
    Negate,
    /// `@X`
    Address,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Real(f64),
    String(SmolStr),
    Nil,
}

/// An expression.
///
/// Names and member accesses carry their identifier so the resolver can key
/// bindings on its position.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal, LineCol),
    Name(Ident),
    Member {
        base: Box<Expr>,
        member: Ident,
    },
    Index {
        base: Box<Expr>,
        indices: Vec<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Paren(Box<Expr>),
    /// `Low..High`, inside set literals and case labels.
    Range {
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `[A, B..C]`
    Set(Vec<Expr>, LineCol),
    /// `inherited` or `inherited Name`.
    Inherited {
        pos: LineCol,
        name: Option<Ident>,
    },
}

impl Expr {
    pub fn name(text: &str, line: u32, col: u32) -> Self {
        Expr::Name(Ident::new(text, line, col))
    }

    pub fn int(value: i64, line: u32, col: u32) -> Self {
        Expr::Literal(Literal::Integer(value), LineCol::new(line, col))
    }

    pub fn real(value: f64, line: u32, col: u32) -> Self {
        Expr::Literal(Literal::Real(value), LineCol::new(line, col))
    }

    pub fn string(value: &str, line: u32, col: u32) -> Self {
        Expr::Literal(Literal::String(SmolStr::new(value)), LineCol::new(line, col))
    }

    pub fn nil(line: u32, col: u32) -> Self {
        Expr::Literal(Literal::Nil, LineCol::new(line, col))
    }

    /// `self.member`
    pub fn dot(self, member: &str, line: u32, col: u32) -> Self {
        Expr::Member {
            base: Box::new(self),
            member: Ident::new(member, line, col),
        }
    }

    /// `self(args)`
    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(self),
            args,
        }
    }

    /// `self[indices]`
    pub fn index(self, indices: Vec<Expr>) -> Self {
        Expr::Index {
            base: Box::new(self),
            indices,
        }
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn range(low: Expr, high: Expr) -> Self {
        Expr::Range {
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parentheses(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }

    /// Whether this is an integer literal, ignoring parentheses.
    pub fn is_integer_literal(&self) -> bool {
        matches!(self.skip_parentheses(), Expr::Literal(Literal::Integer(_), _))
    }

    /// The value of an integer literal, ignoring parentheses and unary signs.
    pub fn integer_value(&self) -> Option<i64> {
        match self.skip_parentheses() {
            Expr::Literal(Literal::Integer(value), _) => Some(*value),
            Expr::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => operand.integer_value().map(|v| v.wrapping_neg()),
            Expr::Unary {
                op: UnaryOperator::Plus,
                operand,
            } => operand.integer_value(),
            _ => None,
        }
    }

    /// Position of the leftmost token.
    pub fn pos(&self) -> LineCol {
        match self {
            Expr::Literal(_, pos) | Expr::Set(_, pos) | Expr::Inherited { pos, .. } => *pos,
            Expr::Name(ident) => ident.pos,
            Expr::Member { base, .. }
            | Expr::Index { base, .. }
            | Expr::Call { callee: base, .. } => base.pos(),
            Expr::Binary { left, .. } => left.pos(),
            Expr::Unary { operand, .. } => operand.pos(),
            Expr::Paren(inner) => inner.pos(),
            Expr::Range { low, .. } => low.pos(),
        }
    }

    /// The identifiers of a plain `A.B.C` chain, or `None` if this
    /// expression is anything else.
    pub fn dotted_path(&self) -> Option<Vec<&Ident>> {
        match self {
            Expr::Name(ident) => Some(vec![ident]),
            Expr::Member { base, member } => {
                let mut path = base.dotted_path()?;
                path.push(member);
                Some(path)
            }
            _ => None,
        }
    }
}

/// `begin ... end`. Each block opens its own scope for inline variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub begin: LineCol,
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(line: u32, col: u32, stmts: Vec<Stmt>) -> Self {
        Self {
            begin: LineCol::new(line, col),
            stmts,
        }
    }
}

/// The control variable of a `for` loop.
#[derive(Clone, Debug, PartialEq)]
pub enum ForVar {
    /// `for I := ...` with `I` declared elsewhere.
    Reference(Ident),
    /// `for var I: Integer := ...`
    Declaration { name: Ident, ty: Option<TypeExpr> },
}

impl ForVar {
    pub fn ident(&self) -> &Ident {
        match self {
            ForVar::Reference(ident) | ForVar::Declaration { name: ident, .. } => ident,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Compound(Block),
    Assign {
        target: Expr,
        value: Expr,
    },
    /// A call or bare routine name used as a statement.
    Call(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Repeat {
        body: Vec<Stmt>,
        cond: Expr,
    },
    ForTo {
        var: ForVar,
        start: Expr,
        end: Expr,
        downto: bool,
        body: Box<Stmt>,
    },
    ForIn {
        var: ForVar,
        collection: Expr,
        body: Box<Stmt>,
    },
    /// Inline `var A, B: T := Value;`
    Var {
        names: Vec<Ident>,
        ty: Option<TypeExpr>,
        value: Option<Expr>,
    },
    Raise(Option<Expr>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_parentheses() {
        let expr = Expr::Paren(Box::new(Expr::Paren(Box::new(Expr::int(3, 1, 2)))));
        assert!(expr.is_integer_literal());
        assert_eq!(expr.skip_parentheses(), &Expr::int(3, 1, 2));
    }

    #[test]
    fn test_integer_value_through_signs() {
        let expr = Expr::unary(UnaryOperator::Negate, Expr::Paren(Box::new(Expr::int(7, 0, 1))));
        assert_eq!(expr.integer_value(), Some(-7));
        assert_eq!(Expr::name("X", 0, 0).integer_value(), None);
    }

    #[test]
    fn test_dotted_path() {
        let expr = Expr::name("System", 2, 0).dot("SysUtils", 2, 7).dot("Format", 2, 16);
        let path = expr.dotted_path().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[2].name.as_str(), "Format");
        assert_eq!(expr.pos(), LineCol::new(2, 0));

        let call = Expr::name("F", 0, 0).call(vec![]).dot("X", 0, 4);
        assert!(call.dotted_path().is_none());
    }
}
