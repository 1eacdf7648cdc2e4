//! # Symbolic Engine Derivatives Module
//!
//! Extends the symbolic engine with analytical differentiation and direct numerical
//! evaluation.
//!
//! ## Key Methods
//!
//! ### Differentiation
//! - `diff(var: &str)` - Analytical partial derivative
//! - `diff_multi_args()` - Partial derivatives for an ordered list of variables
//!
//! ### Function evaluation
//! - `eval_expression()` - Direct evaluation with variables bound by position
//! - `eval_map()` - Direct evaluation with variables bound by name
//!
//! ### Utilities
//! - `all_arguments_are_variables()` - Sorted list of free variable names
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Differentiation Rules**: product rule, quotient rule, general power rule and
//!    chain rule for `ln` and `arctg`
//!
//! 2. **Branch-wise Piecewise Derivative**: each branch value is differentiated, the branch
//!    conditions are kept as they are
//!
//! 3. **Lazy Branch Evaluation**: numerical evaluation of a piecewise expression only visits
//!    the selected branch

use crate::symbolic::symbolic_engine::{EvalError, Expr};
use std::collections::HashMap;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard differentiation rules:
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - g'*f)/g^2
    /// - Power rule: d/dx(f^g) = g*f^(g-1)*f' + f^g*ln(f)*g'
    ///   (the second part only when the exponent depends on x)
    /// - Chain rule for ln and arctg
    ///
    /// The result is not simplified; call `simplify_()` or `simplify()` afterwards.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").simplify_(); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            Expr::Pow(base, exp) => {
                let power_part = Expr::Mul(
                    Box::new(Expr::Mul(
                        exp.clone(),
                        Box::new(Expr::Pow(
                            base.clone(),
                            Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                        )),
                    )),
                    Box::new(base.diff(var)),
                );
                if exp.contains_variable(var) {
                    // d/dx exp(g*ln(f)) contributes f^g*ln(f)*g'
                    let exponent_part = Expr::Mul(
                        Box::new(Expr::Mul(
                            Box::new(self.clone()),
                            Box::new(Expr::Ln(base.clone())),
                        )),
                        Box::new(exp.diff(var)),
                    );
                    Expr::Add(Box::new(power_part), Box::new(exponent_part))
                } else {
                    power_part
                }
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::Piecewise(branches) => Expr::Piecewise(
                branches
                    .iter()
                    .map(|(value, cond)| (value.diff(var), cond.clone()))
                    .collect(),
            ),
        }
    } // end of diff

    /// Computes partial derivatives with respect to specified variables, in the given order.
    pub fn diff_multi_args(&self, all_vars: &[&str]) -> Vec<Expr> {
        all_vars.iter().map(|var| self.diff(var)).collect()
    }

    /// Extracts all unique variable names from the symbolic expression.
    ///
    /// Returns a sorted, deduplicated list of variable names, including the
    /// variables used in piecewise conditions.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    } // end of all_arguments_are_variables

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Expr::Var(name) => vars.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
            Expr::Ln(expr) | Expr::arctg(expr) => expr.collect_variables(vars),
            Expr::Piecewise(branches) => {
                for (value, cond) in branches {
                    value.collect_variables(vars);
                    if let crate::symbolic::symbolic_engine::Condition::Greater(lhs, rhs) = cond {
                        lhs.collect_variables(vars);
                        rhs.collect_variables(vars);
                    }
                }
            }
        }
    }

    /// DIRECT EXPRESSION EVALUATION

    /// Evaluates symbolic expression directly with variables bound by position.
    ///
    /// # Arguments
    /// * `vars` - Variable names in order matching values array
    /// * `values` - Numerical values for each variable
    ///
    /// # Errors
    /// `EvalError::BindingMismatch` if the slices differ in length,
    /// `EvalError::UnboundVariable` if the expression uses a name not in `vars`.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> Result<f64, EvalError> {
        if vars.len() != values.len() {
            return Err(EvalError::BindingMismatch {
                vars: vars.len(),
                values: values.len(),
            });
        }
        let bindings: HashMap<String, f64> = vars
            .iter()
            .zip(values.iter())
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        self.eval_map(&bindings)
    } // end of eval_expression

    /// Evaluates symbolic expression with variables bound by name.
    ///
    /// A piecewise expression evaluates only its selected branch; when no condition holds
    /// the result is NaN.
    pub fn eval_map(&self, values: &HashMap<String, f64>) -> Result<f64, EvalError> {
        match self {
            Expr::Var(name) => values
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
            Expr::Const(val) => Ok(*val),
            Expr::Add(lhs, rhs) => Ok(lhs.eval_map(values)? + rhs.eval_map(values)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval_map(values)? - rhs.eval_map(values)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval_map(values)? * rhs.eval_map(values)?),
            Expr::Div(lhs, rhs) => Ok(lhs.eval_map(values)? / rhs.eval_map(values)?),
            Expr::Pow(base, exp) => {
                let base_val = base.eval_map(values)?;
                let exp_val = exp.eval_map(values)?;
                if exp_val == 0.5 {
                    Ok(base_val.sqrt())
                } else {
                    Ok(base_val.powf(exp_val))
                }
            }
            Expr::Ln(expr) => Ok(expr.eval_map(values)?.ln()),
            Expr::arctg(expr) => Ok(expr.eval_map(values)?.atan()),
            Expr::Piecewise(branches) => {
                for (value, cond) in branches {
                    if cond.eval_map(values)? {
                        return value.eval_map(values);
                    }
                }
                Ok(f64::NAN)
            }
        }
    }
}
