#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) builds symbolic expressions from variables, constants and operators
/// 2) turns a symbolic expression into a string for printing and control results
/// 3) differentiates and evaluates symbolic expressions
///# Example#
/// ```
/// use tauc_lorentz_gen::symbolic::symbolic_engine::Expr;
/// let (x, y) = tauc_lorentz_gen::symbols!(x, y);
/// let f = x.clone() * y.clone().ln() + Expr::Const(2.0);
/// println!("f = {}", f);
/// // differentiate with respect to x and y
/// let df_dx = f.diff("x").simplify();
/// let df_dy = f.diff("y").simplify();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// // evaluate with variables bound by position
/// let f_res = f.eval_expression(&["x", "y"], &[3.0, 1.0]).unwrap();
/// assert_eq!(f_res, 2.0);
/// assert_eq!(df_dy.eval_expression(&["x", "y"], &[3.0, 2.0]).unwrap(), 1.5);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
#[cfg(test)]
mod symbolic_engine_tests;
/// algebraic simplification: constant folding, identities, power merging
pub mod symbolic_simplify;
///________________________________________________________________________________________________________________________________________________
/// # Common subexpression elimination
/// ```
/// use tauc_lorentz_gen::symbolic::symbolic_cse::Cse;
/// let (x, y) = tauc_lorentz_gen::symbols!(x, y);
/// let sum = x + y;
/// let result = Cse::new().optimize(&[sum.clone() * sum.clone(), sum.ln()]);
/// assert_eq!(result.definitions.len(), 1);
/// assert_eq!(result.definitions[0].0, "x0");
/// let values = result.evaluate(&["x", "y"], &[1.0, 2.0]).unwrap();
/// assert_eq!(values[0], 9.0);
/// ```
pub mod symbolic_cse;
///________________________________________________________________________________________________________________________________________________
///
/// calculate symbolic jacobian and evaluate it
pub mod symbolic_functions;
///______________________________________________________________________________________________________________________________________________
/// finite differences used to check analytical derivatives
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
