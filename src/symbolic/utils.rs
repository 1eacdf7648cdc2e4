// finite-difference helpers used to check analytical derivatives
use crate::symbolic::symbolic_engine::{EvalError, Expr};
use nalgebra::DMatrix;

/*
    // Define a point
    let x_values = vec![1.0, 2.0, 0.5];
    // Define the step size for the numerical derivative
    let h = 1e-6;
    // Compute the central differences with respect to every coordinate
    let derivatives = numerical_derivative_multi(f, &x_values, h);
*/
//  df/dx_i = (f(.., x_i + h, ..) - f(.., x_i - h, ..)) / 2h
pub fn numerical_derivative_multi<F>(f: F, x_values: &[f64], h: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut derivatives = Vec::with_capacity(x_values.len());
    for i in 0..x_values.len() {
        let mut x_plus_h = x_values.to_vec();
        let mut x_minus_h = x_values.to_vec();

        x_plus_h[i] += h;
        x_minus_h[i] -= h;

        let f_x_plus_h = f(&x_plus_h);
        let f_x_minus_h = f(&x_minus_h);

        let derivative = (f_x_plus_h - f_x_minus_h) / (2.0 * h);
        derivatives.push(derivative);
    }

    derivatives
}

/// Central-difference jacobian of symbolic functions at `point`: row i is function i,
/// column j is variable j.
pub fn numerical_jacobian(
    functions: &[Expr],
    vars: &[&str],
    point: &[f64],
    h: f64,
) -> Result<DMatrix<f64>, EvalError> {
    let mut jacobian = DMatrix::zeros(functions.len(), vars.len());
    for (i, function) in functions.iter().enumerate() {
        // surface the first evaluation error instead of differencing NaNs
        function.eval_expression(vars, point)?;
        let row = numerical_derivative_multi(
            |x| function.eval_expression(vars, x).unwrap_or(f64::NAN),
            point,
            h,
        );
        for (j, value) in row.into_iter().enumerate() {
            jacobian[(i, j)] = value;
        }
    }
    Ok(jacobian)
}

// compute norm of two vectors
pub fn norm(x: &[f64], y: &[f64]) -> f64 {
    (1.0 / x.len() as f64)
        * x.iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_numerical_derivative_multi() {
        // f = x^2 * y, grad = (2xy, x^2)
        let f = |v: &[f64]| v[0] * v[0] * v[1];
        let grad = numerical_derivative_multi(f, &[3.0, 2.0], 1e-5);
        assert_relative_eq!(grad[0], 12.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 9.0, epsilon = 1e-6);
    }

    #[test]
    fn test_numerical_jacobian() {
        let x = Expr::Var("x".to_string());
        let y = Expr::Var("y".to_string());
        let functions = vec![x.clone() * y.clone(), x.clone().ln() + y.clone()];
        let jac = numerical_jacobian(&functions, &["x", "y"], &[2.0, 5.0], 1e-6).unwrap();
        assert_relative_eq!(jac[(0, 0)], 5.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(0, 1)], 2.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(1, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(jac[(1, 1)], 1.0, epsilon = 1e-6);

        let err = numerical_jacobian(&functions, &["x"], &[2.0], 1e-6);
        assert_eq!(err, Err(EvalError::UnboundVariable("y".to_string())));
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_relative_eq!(norm(&[3.0, 0.0], &[0.0, 4.0]), 2.5, epsilon = 1e-12);
    }
}
