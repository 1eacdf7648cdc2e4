//! Re-parameterization of the Tauc-Lorentz oscillator.
//!
//! The fitted parameters `(a_p, e0_p, c_p)` map onto the physical `(a, e0, c)` so that any
//! positive `e0_p`, `c_p` gives `e0 > c / sqrt(2)`:
//!
//! - `e0 = (e0_p^4 + c_p^4 / 4)^(1/4)`
//! - `c = sqrt(2 e0^2 - 2 e0_p^2)`
//! - `a = a_p c_p^4 / (4 e0 c)`
//!
//! The forward direction is only needed numerically.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_functions::Jacobian;
use log::info;

/// Constrained parameters, Jacobian column order.
pub const TRANSFORM_PARAMETERS: [&str; 3] = ["a_p", "e0_p", "c_p"];

/// Symbolic scalars of the constrained parameterization.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSymbols {
    pub a_p: Expr,
    pub e0_p: Expr,
    pub c_p: Expr,
}

impl Default for ParameterSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSymbols {
    pub fn new() -> Self {
        let (a_p, e0_p, c_p) = crate::symbols!(a_p, e0_p, c_p);
        ParameterSymbols { a_p, e0_p, c_p }
    }
}

/// `(a, e0, c)` as expressions of `(a_p, e0_p, c_p)`.
pub fn inverse_transform(a_p: &Expr, e0_p: &Expr, c_p: &Expr) -> (Expr, Expr, Expr) {
    let pow = |x: &Expr, n: f64| x.clone().pow(Expr::Const(n));

    let e0 = (pow(e0_p, 4.0) + pow(c_p, 4.0) / Expr::Const(4.0)).pow(Expr::Const(0.25));
    let c = (Expr::Const(2.0) * pow(&e0, 2.0) - Expr::Const(2.0) * pow(e0_p, 2.0)).sqrt();
    let a = a_p.clone() * pow(c_p, 4.0) / (Expr::Const(4.0) * e0.clone() * c.clone());
    (a, e0, c)
}

/// Symbolic Jacobian of the inverse transform: rows `a, e0, c`, columns `a_p, e0_p, c_p`.
pub fn parameters_jacobian() -> Jacobian {
    let ParameterSymbols { a_p, e0_p, c_p } = ParameterSymbols::new();
    let (a, e0, c) = inverse_transform(&a_p, &e0_p, &c_p);
    let mut jacobian = Jacobian::from_vectors(vec![a, e0, c], TRANSFORM_PARAMETERS.to_vec());
    jacobian.calc_jacobian();
    info!(
        "parameter jacobian: {} nodes",
        jacobian
            .flat_row_major()
            .iter()
            .map(|e| e.node_count())
            .sum::<usize>()
    );
    jacobian
}

/// Numerical inverse transform, `(a_p, e0_p, c_p) -> (a, e0, c)`.
pub fn inverse_transform_values(a_p: f64, e0_p: f64, c_p: f64) -> (f64, f64, f64) {
    let e0 = (e0_p.powi(4) + c_p.powi(4) / 4.0).powf(0.25);
    let c = (2.0 * e0 * e0 - 2.0 * e0_p * e0_p).sqrt();
    let a = a_p * c_p.powi(4) / (4.0 * e0 * c);
    (a, e0, c)
}

/// Numerical forward transform, `(a, e0, c) -> (a_p, e0_p, c_p)`.
///
/// Real only for `e0 > c / sqrt(2)`, NaN otherwise.
pub fn forward_transform(a: f64, e0: f64, c: f64) -> (f64, f64, f64) {
    let e0_p2 = e0 * e0 - c * c / 2.0;
    let c_p4 = 4.0 * (e0.powi(4) - e0_p2 * e0_p2);
    let a_p = 4.0 * a * e0 * c / c_p4;
    (a_p, e0_p2.sqrt(), c_p4.powf(0.25))
}
