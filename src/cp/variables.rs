//! Decision-variable handles and linear expressions.
//!
//! Variables are lightweight indices into a [`CpModel`](super::CpModel);
//! they carry no domain data of their own. Booleans enter constraints
//! through [`Literal`]s, which add optional negation, and contribute 1 or 0
//! to linear expressions.

use std::ops::Not;

/// Handle to an integer decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVar(pub(crate) u32);

impl IntVar {
    /// Position in the model's integer-variable table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVar(pub(crate) u32);

impl BoolVar {
    /// Position in the model's boolean-variable table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The positive literal of this variable.
    #[inline]
    pub fn lit(self) -> Literal {
        Literal {
            var: self,
            negated: false,
        }
    }
}

impl Not for BoolVar {
    type Output = Literal;

    /// The negated literal of this variable.
    fn not(self) -> Literal {
        Literal {
            var: self,
            negated: true,
        }
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        var.lit()
    }
}

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    var: BoolVar,
    negated: bool,
}

impl Literal {
    /// Underlying variable.
    #[inline]
    pub fn var(self) -> BoolVar {
        self.var
    }

    /// Whether this literal negates its variable.
    #[inline]
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Truth value of the literal given its variable's value.
    #[inline]
    pub fn holds_given(self, var_value: bool) -> bool {
        var_value != self.negated
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// One term of a linear expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// An integer variable.
    Int(IntVar),
    /// A literal contributing 1 when true, 0 when false.
    Lit(Literal),
}

/// Weighted sum of variables and literals, plus a constant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(Term, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// Empty expression (constant 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-variable expression.
    pub fn from_var(var: IntVar) -> Self {
        Self::new().plus_var(var)
    }

    /// Single-literal expression.
    pub fn from_lit(lit: impl Into<Literal>) -> Self {
        Self::new().plus_lit(lit)
    }

    /// Sum of literals, coefficient 1 each.
    pub fn sum_of_lits<I, L>(literals: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        let mut expr = Self::new();
        for lit in literals {
            expr = expr.plus_lit(lit);
        }
        expr
    }

    /// Sum of integer variables, coefficient 1 each.
    pub fn sum_of_vars<I: IntoIterator<Item = IntVar>>(vars: I) -> Self {
        let mut expr = Self::new();
        for var in vars {
            expr = expr.plus_var(var);
        }
        expr
    }

    /// Adds `var` with coefficient 1.
    pub fn plus_var(self, var: IntVar) -> Self {
        self.plus_term(var, 1)
    }

    /// Adds `var` with an explicit coefficient.
    pub fn plus_term(mut self, var: IntVar, coefficient: i64) -> Self {
        self.terms.push((Term::Int(var), coefficient));
        self
    }

    /// Adds a literal with coefficient 1.
    pub fn plus_lit(self, lit: impl Into<Literal>) -> Self {
        self.plus_lit_term(lit, 1)
    }

    /// Adds a literal with an explicit coefficient.
    pub fn plus_lit_term(mut self, lit: impl Into<Literal>, coefficient: i64) -> Self {
        self.terms.push((Term::Lit(lit.into()), coefficient));
        self
    }

    /// Adds a constant offset.
    pub fn plus_constant(mut self, value: i64) -> Self {
        self.constant += value;
        self
    }

    /// Terms with their coefficients, in insertion order.
    #[inline]
    pub fn terms(&self) -> &[(Term, i64)] {
        &self.terms
    }

    /// Constant offset.
    #[inline]
    pub fn constant(&self) -> i64 {
        self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_negation() {
        let var = BoolVar(0);
        let lit = var.lit();
        assert!(!lit.is_negated());
        assert!((!lit).is_negated());
        assert_eq!(!!lit, lit);
        assert_eq!(!var, !lit.var().lit());
    }

    #[test]
    fn test_literal_holds_given() {
        let var = BoolVar(3);
        assert!(var.lit().holds_given(true));
        assert!(!var.lit().holds_given(false));
        assert!((!var).holds_given(false));
        assert!(!(!var).holds_given(true));
    }

    #[test]
    fn test_expr_builders() {
        let x = IntVar(0);
        let y = IntVar(1);
        let b = BoolVar(0);

        let expr = LinearExpr::from_var(x)
            .plus_term(y, -1)
            .plus_lit(b)
            .plus_constant(5);
        assert_eq!(expr.terms().len(), 3);
        assert_eq!(expr.constant(), 5);

        let sum = LinearExpr::sum_of_vars([x, y]);
        assert_eq!(sum.terms().len(), 2);
        assert_eq!(sum.constant(), 0);

        let lits = LinearExpr::sum_of_lits([b.lit(), !b]);
        assert_eq!(lits.terms().len(), 2);
    }
}
