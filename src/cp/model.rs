//! Constraint model container.
//!
//! Holds variable domains, posted constraints, and the optional objective.
//! Semantics follow CP-SAT conventions: enforcement literals make a
//! constraint vacuous whenever any of them is false, and posting a
//! constraint under `lit` plus its complement under `!lit` yields an iff
//! encoding.
//!
//! # References
//!
//! - Perron & Furnon, "OR-Tools CP-SAT" (enforcement-literal conventions)

use crate::cp::variables::{BoolVar, IntVar, LinearExpr, Literal, Term};

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `expr == rhs`
    Eq,
    /// `expr != rhs`
    Ne,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

impl CmpOp {
    /// Applies the comparison.
    #[inline]
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// A posted constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `expr ⟨op⟩ rhs`, enforced only while every `only_if` literal holds.
    Linear {
        expr: LinearExpr,
        op: CmpOp,
        rhs: i64,
        only_if: Vec<Literal>,
    },
    /// Every literal true, enforced only while every `only_if` literal holds.
    BoolAnd {
        literals: Vec<Literal>,
        only_if: Vec<Literal>,
    },
    /// At least one literal true, enforced only while every `only_if`
    /// literal holds.
    BoolOr {
        literals: Vec<Literal>,
        only_if: Vec<Literal>,
    },
    /// `target == min(exprs)`.
    MinEquality {
        target: LinearExpr,
        exprs: Vec<LinearExpr>,
    },
    /// `target == max(exprs)`.
    MaxEquality {
        target: LinearExpr,
        exprs: Vec<LinearExpr>,
    },
}

impl Constraint {
    /// Visits every variable the constraint references, duplicates included.
    pub fn for_each_var(&self, mut f: impl FnMut(ModelVar)) {
        match self {
            Constraint::Linear { expr, only_if, .. } => {
                visit_expr(expr, &mut f);
                for lit in only_if {
                    f(ModelVar::Bool(lit.var()));
                }
            }
            Constraint::BoolAnd { literals, only_if }
            | Constraint::BoolOr { literals, only_if } => {
                for lit in literals.iter().chain(only_if) {
                    f(ModelVar::Bool(lit.var()));
                }
            }
            Constraint::MinEquality { target, exprs }
            | Constraint::MaxEquality { target, exprs } => {
                visit_expr(target, &mut f);
                for expr in exprs {
                    visit_expr(expr, &mut f);
                }
            }
        }
    }
}

fn visit_expr(expr: &LinearExpr, f: &mut impl FnMut(ModelVar)) {
    for (term, _) in expr.terms() {
        match term {
            Term::Int(var) => f(ModelVar::Int(*var)),
            Term::Lit(lit) => f(ModelVar::Bool(lit.var())),
        }
    }
}

/// A declared variable of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVar {
    /// Integer variable.
    Int(IntVar),
    /// Boolean variable.
    Bool(BoolVar),
}

/// Finite-domain constraint model.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    int_domains: Vec<Vec<i64>>,
    num_bools: usize,
    declared: Vec<ModelVar>,
    constraints: Vec<Constraint>,
    objective: Option<LinearExpr>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an integer variable over an inclusive range.
    pub fn new_int_var(&mut self, min: i64, max: i64) -> IntVar {
        self.new_int_var_from_values((min..=max).collect())
    }

    /// Declares an integer variable over an explicit value set.
    ///
    /// Values keep the given order; solvers may use it as a branching
    /// order. An empty set makes the model invalid.
    pub fn new_int_var_from_values(&mut self, values: Vec<i64>) -> IntVar {
        let var = IntVar(self.int_domains.len() as u32);
        self.int_domains.push(values);
        self.declared.push(ModelVar::Int(var));
        var
    }

    /// Declares a boolean variable.
    pub fn new_bool_var(&mut self) -> BoolVar {
        let var = BoolVar(self.num_bools as u32);
        self.num_bools += 1;
        self.declared.push(ModelVar::Bool(var));
        var
    }

    /// Posts `expr ⟨op⟩ rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, op: CmpOp, rhs: i64) {
        self.add_linear_only_if(expr, op, rhs, &[]);
    }

    /// Posts `expr ⟨op⟩ rhs`, enforced only while all of `only_if` hold.
    pub fn add_linear_only_if(
        &mut self,
        expr: LinearExpr,
        op: CmpOp,
        rhs: i64,
        only_if: &[Literal],
    ) {
        self.constraints.push(Constraint::Linear {
            expr,
            op,
            rhs,
            only_if: only_if.to_vec(),
        });
    }

    /// Posts "all literals true", enforced only while all of `only_if` hold.
    pub fn add_bool_and_only_if(&mut self, literals: Vec<Literal>, only_if: &[Literal]) {
        self.constraints.push(Constraint::BoolAnd {
            literals,
            only_if: only_if.to_vec(),
        });
    }

    /// Posts "at least one literal true".
    pub fn add_bool_or(&mut self, literals: Vec<Literal>) {
        self.add_bool_or_only_if(literals, &[]);
    }

    /// Posts "at least one literal true", enforced only while all of
    /// `only_if` hold.
    pub fn add_bool_or_only_if(&mut self, literals: Vec<Literal>, only_if: &[Literal]) {
        self.constraints.push(Constraint::BoolOr {
            literals,
            only_if: only_if.to_vec(),
        });
    }

    /// Posts `target == min(exprs)`. An empty collection makes the model
    /// invalid.
    pub fn add_min_equality(&mut self, target: LinearExpr, exprs: Vec<LinearExpr>) {
        self.constraints
            .push(Constraint::MinEquality { target, exprs });
    }

    /// Posts `target == max(exprs)`. An empty collection makes the model
    /// invalid.
    pub fn add_max_equality(&mut self, target: LinearExpr, exprs: Vec<LinearExpr>) {
        self.constraints
            .push(Constraint::MaxEquality { target, exprs });
    }

    /// Sets the minimization objective, replacing any previous one.
    pub fn minimize(&mut self, objective: LinearExpr) {
        self.objective = Some(objective);
    }

    /// Number of integer variables.
    #[inline]
    pub fn num_int_vars(&self) -> usize {
        self.int_domains.len()
    }

    /// Number of boolean variables.
    #[inline]
    pub fn num_bool_vars(&self) -> usize {
        self.num_bools
    }

    /// Domain of an integer variable.
    #[inline]
    pub fn domain(&self, var: IntVar) -> &[i64] {
        &self.int_domains[var.index()]
    }

    /// Variables in declaration order.
    #[inline]
    pub fn declared_vars(&self) -> &[ModelVar] {
        &self.declared
    }

    /// Posted constraints in posting order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of posted constraints.
    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Minimization objective, if set.
    #[inline]
    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }

    /// Structural validation: non-empty domains, non-empty min/max
    /// collections, no references to undeclared variables.
    pub fn validate(&self) -> Result<(), String> {
        for (index, domain) in self.int_domains.iter().enumerate() {
            if domain.is_empty() {
                return Err(format!("integer variable {index} has an empty domain"));
            }
        }
        for (index, constraint) in self.constraints.iter().enumerate() {
            if let Constraint::MinEquality { exprs, .. } | Constraint::MaxEquality { exprs, .. } =
                constraint
            {
                if exprs.is_empty() {
                    return Err(format!("constraint {index} takes min/max of nothing"));
                }
            }
            let mut bad = None;
            constraint.for_each_var(|var| match var {
                ModelVar::Int(v) if v.index() >= self.int_domains.len() => {
                    bad.get_or_insert_with(|| {
                        format!(
                            "constraint {index} references undeclared integer variable {}",
                            v.index()
                        )
                    });
                }
                ModelVar::Bool(v) if v.index() >= self.num_bools => {
                    bad.get_or_insert_with(|| {
                        format!(
                            "constraint {index} references undeclared boolean variable {}",
                            v.index()
                        )
                    });
                }
                _ => {}
            });
            if let Some(message) = bad {
                return Err(message);
            }
        }
        if let Some(objective) = &self.objective {
            let mut bad = None;
            visit_expr(objective, &mut |var| match var {
                ModelVar::Int(v) if v.index() >= self.int_domains.len() => {
                    bad.get_or_insert_with(|| {
                        format!(
                            "objective references undeclared integer variable {}",
                            v.index()
                        )
                    });
                }
                ModelVar::Bool(v) if v.index() >= self.num_bools => {
                    bad.get_or_insert_with(|| {
                        format!(
                            "objective references undeclared boolean variable {}",
                            v.index()
                        )
                    });
                }
                _ => {}
            });
            if let Some(message) = bad {
                return Err(message);
            }
        }
        Ok(())
    }
}
