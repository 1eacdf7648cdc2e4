//! # C++ expression printer
//!
//! Prints a symbolic expression as a single C++ expression of type `double`.
//!
//! - `+ - * /` are printed infix with the minimum parentheses that keep the tree's
//!   evaluation order; operands are never re-associated, so `a - (b - c)` keeps its
//!   parentheses and `(a * b) * c` prints as `a*b*c`
//! - constants are always `double` literals (`2.0`, never `2`), `PI` is `M_PI`
//! - `x^0.5` is `std::sqrt(x)`, any other power is `std::pow(x, y)`
//! - `ln` is `std::log`, `arctg` is `std::atan`
//! - a piecewise expression is a chain of conditional operators,
//!   `((en > eg) ? (v1) : (v2))`

use crate::symbolic::symbolic_engine::{Condition, Expr};
use std::f64::consts::PI;
use thiserror::Error;

/// Errors raised while printing an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    #[error("constant {0} has no C++ double literal")]
    NonFiniteConstant(f64),
    #[error("`{0}` is not a valid C++ identifier")]
    InvalidIdentifier(String),
    #[error("piecewise expression without branches")]
    EmptyPiecewise,
    #[error("piecewise branch {0} follows the unconditional branch")]
    UnreachableBranch(usize),
    #[error("piecewise expression has no unconditional fallback branch")]
    MissingDefaultBranch,
}

/// Binding strength of the printed form, higher binds tighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Add = 1,
    Mul = 2,
    Unary = 3,
    Atom = 4,
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

/// Prints `expr` as a C++ expression.
pub fn cxx_code(expr: &Expr) -> Result<String, EmitError> {
    Ok(print(expr)?.0)
}

fn wrap(printed: (String, Prec), min: Prec) -> String {
    if printed.1 < min {
        format!("({})", printed.0)
    } else {
        printed.0
    }
}

fn print_const(val: f64) -> Result<(String, Prec), EmitError> {
    if !val.is_finite() {
        return Err(EmitError::NonFiniteConstant(val));
    }
    if val == PI {
        return Ok(("M_PI".to_string(), Prec::Atom));
    }
    // Debug formatting keeps the fractional part: 2.0, 0.25, 1e-10
    let literal = format!("{:?}", val);
    let prec = if val.is_sign_negative() {
        Prec::Unary
    } else {
        Prec::Atom
    };
    Ok((literal, prec))
}

fn print(expr: &Expr) -> Result<(String, Prec), EmitError> {
    let printed = match expr {
        Expr::Var(name) => {
            if !is_identifier(name) {
                return Err(EmitError::InvalidIdentifier(name.clone()));
            }
            (name.clone(), Prec::Atom)
        }
        Expr::Const(val) => print_const(*val)?,
        Expr::Add(lhs, rhs) => (
            format!("{} + {}", wrap(print(lhs)?, Prec::Add), wrap(print(rhs)?, Prec::Mul)),
            Prec::Add,
        ),
        Expr::Sub(lhs, rhs) => (
            format!("{} - {}", wrap(print(lhs)?, Prec::Add), wrap(print(rhs)?, Prec::Mul)),
            Prec::Add,
        ),
        Expr::Mul(lhs, rhs) if matches!(lhs.as_ref(), Expr::Const(val) if *val == -1.0) => {
            (format!("-{}", wrap(print(rhs)?, Prec::Atom)), Prec::Unary)
        }
        Expr::Mul(lhs, rhs) => (
            format!("{}*{}", wrap(print(lhs)?, Prec::Mul), wrap(print(rhs)?, Prec::Atom)),
            Prec::Mul,
        ),
        Expr::Div(lhs, rhs) => (
            format!("{}/{}", wrap(print(lhs)?, Prec::Mul), wrap(print(rhs)?, Prec::Atom)),
            Prec::Mul,
        ),
        Expr::Pow(base, exp) => {
            let base = print(base)?.0;
            if matches!(exp.as_ref(), Expr::Const(val) if *val == 0.5) {
                (format!("std::sqrt({})", base), Prec::Atom)
            } else {
                (format!("std::pow({}, {})", base, print(exp)?.0), Prec::Atom)
            }
        }
        Expr::Ln(arg) => (format!("std::log({})", print(arg)?.0), Prec::Atom),
        Expr::arctg(arg) => (format!("std::atan({})", print(arg)?.0), Prec::Atom),
        Expr::Piecewise(branches) => (print_piecewise(branches)?, Prec::Atom),
    };
    Ok(printed)
}

fn print_condition(cond: &Condition) -> Result<String, EmitError> {
    match cond {
        Condition::Greater(lhs, rhs) => Ok(format!("{} > {}", print(lhs)?.0, print(rhs)?.0)),
        Condition::Always => Ok("true".to_string()),
    }
}

fn print_piecewise(branches: &[(Expr, Condition)]) -> Result<String, EmitError> {
    if branches.is_empty() {
        return Err(EmitError::EmptyPiecewise);
    }
    let fallback = branches
        .iter()
        .position(|(_, cond)| *cond == Condition::Always)
        .ok_or(EmitError::MissingDefaultBranch)?;
    if fallback + 1 < branches.len() {
        return Err(EmitError::UnreachableBranch(fallback + 1));
    }
    let mut code = print(&branches[fallback].0)?.0;
    for (value, cond) in branches[..fallback].iter().rev() {
        code = format!(
            "(({}) ? ({}) : ({}))",
            print_condition(cond)?,
            print(value)?.0,
            code
        );
    }
    Ok(code)
}
