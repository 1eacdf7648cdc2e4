//! # Symbolic Engine Module
//!
//! Core expression tree used by the code generator. It covers the operator set of the
//! dielectric and parameter models.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic scalars like "en", "e0"
//! - **Constants**: `Const(f64)` - numerical constants (π is `Const(PI)`)
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic, square root is `Pow(x, 0.5)`
//! - **Functions**: `Ln`, `arctg`
//! - **Conditional selection**: `Piecewise` - ordered (value, condition) branches
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - Create multiple variables from comma-separated string
//! - `diff(var: &str)` - Analytical differentiation (see `symbolic_engine_derivatives`)
//! - `simplify()` - Algebraic simplification (see `symbolic_simplify`)
//! - `substitute_variable()` - Replace a variable by an expression
//! - `eval_expression()` - Numerical evaluation with variable bindings
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses Box<Expr> for nested expressions
//!
//! 2. **Operator Overloading**: Implements std::ops traits (Add, Sub, Mul, Div, Neg) so the
//!    model formulas read like the math: `a * c / (pi * csi4)`
//!
//! 3. **Piecewise Branches**: the first branch whose condition holds is selected, the
//!    `Condition::Always` branch closes the list

#![allow(non_camel_case_types)]

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use thiserror::Error;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use tauc_lorentz_gen::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "en", "e0")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Conditional selection: the value of the first branch whose condition holds
    Piecewise(Vec<(Expr, Condition)>),
}

/// Branch condition of a `Piecewise` expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// lhs > rhs
    Greater(Box<Expr>, Box<Expr>),
    /// Always true; closes the branch list
    Always,
}

/// Errors raised by numerical evaluation of an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("variable `{0}` has no value bound")]
    UnboundVariable(String),
    #[error("{vars} variable names given for {values} values")]
    BindingMismatch { vars: usize, values: usize },
}

impl Condition {
    /// Applies `f` to every expression inside the condition.
    pub fn map_exprs<F>(&self, f: F) -> Condition
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Condition::Greater(lhs, rhs) => Condition::Greater(Box::new(f(lhs)), Box::new(f(rhs))),
            Condition::Always => Condition::Always,
        }
    }

    /// Evaluates the condition for the given bindings.
    pub fn eval_map(&self, values: &HashMap<String, f64>) -> Result<bool, EvalError> {
        match self {
            Condition::Greater(lhs, rhs) => Ok(lhs.eval_map(values)? > rhs.eval_map(values)?),
            Condition::Always => Ok(true),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::Greater(lhs, rhs) => write!(f, "{} > {}", lhs, rhs),
            Condition::Always => write!(f, "True"),
        }
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Converts expressions to human-readable mathematical notation with parentheses
/// for proper precedence.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::Piecewise(branches) => {
                write!(f, "Piecewise(")?;
                for (i, (value, cond)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({}, {})", value, cond)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// Whitespace is trimmed and empty names are skipped.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("eg, e0, c");
    /// assert_eq!(vars.len(), 3);
    /// ```
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// The constant π.
    pub fn pi() -> Expr {
        Expr::Const(PI)
    }

    /// Rebuilds the node with `f` applied to each direct child expression.
    pub fn map_children<F>(&self, f: F) -> Expr
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Div(lhs, rhs) => Expr::Div(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Pow(base, exp) => Expr::Pow(Box::new(f(base)), Box::new(f(exp))),
            Expr::Ln(expr) => Expr::Ln(Box::new(f(expr))),
            Expr::arctg(expr) => Expr::arctg(Box::new(f(expr))),
            Expr::Piecewise(branches) => Expr::Piecewise(
                branches
                    .iter()
                    .map(|(value, cond)| (f(value), cond.map_exprs(&f)))
                    .collect(),
            ),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Ln(expr) | Expr::arctg(expr) => expr.contains_variable(var_name),
            Expr::Piecewise(branches) => branches.iter().any(|(value, cond)| {
                value.contains_variable(var_name)
                    || match cond {
                        Condition::Greater(lhs, rhs) => {
                            lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
                        }
                        Condition::Always => false,
                    }
            }),
        }
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates arctangent arctg(self).
    pub fn atan(self) -> Expr {
        Expr::arctg(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Creates square root as self^0.5.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Builds the condition `self > rhs` for a piecewise branch.
    pub fn greater_than(&self, rhs: &Expr) -> Condition {
        Condition::Greater(Box::new(self.clone()), Box::new(rhs.clone()))
    }

    /// Creates a piecewise expression from ordered (value, condition) branches.
    pub fn piecewise(branches: Vec<(Expr, Condition)>) -> Expr {
        Expr::Piecewise(branches)
    }

    /// Number of nodes in the tree, counting shared subtrees once per occurrence.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Var(_) | Expr::Const(_) => 1,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Ln(expr) | Expr::arctg(expr) => 1 + expr.node_count(),
            Expr::Piecewise(branches) => {
                1 + branches
                    .iter()
                    .map(|(value, cond)| {
                        value.node_count()
                            + match cond {
                                Condition::Greater(lhs, rhs) => lhs.node_count() + rhs.node_count(),
                                Condition::Always => 0,
                            }
                    })
                    .sum::<usize>()
            }
        }
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables named after the identifiers
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        ($(
            $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
        ),+)
    };
}
