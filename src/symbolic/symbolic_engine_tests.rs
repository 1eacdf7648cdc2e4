use crate::symbolic::symbolic_engine::{Condition, EvalError, Expr};
use crate::symbols;
use std::f64;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_operators_build_nodes() {
        let (x, y) = symbols!(x, y);
        let bx = || Box::new(x.clone());
        let by = || Box::new(y.clone());
        assert_eq!(x.clone() + y.clone(), Expr::Add(bx(), by()));
        assert_eq!(x.clone() - y.clone(), Expr::Sub(bx(), by()));
        assert_eq!(x.clone() * y.clone(), Expr::Mul(bx(), by()));
        assert_eq!(x.clone() / y.clone(), Expr::Div(bx(), by()));
        // substitution rebuilds every node kind through map_children
        let expr = (x.clone() / y.clone()).atan() - x.clone().pow(y.clone());
        let substituted = expr.substitute_variable("y", &Expr::Const(2.0));
        assert_eq!(
            substituted,
            (x.clone() / Expr::Const(2.0)).atan() - x.clone().pow(Expr::Const(2.0))
        );
    }

    #[test]
    fn test_neg() {
        let expr = Expr::Var("x".to_string());
        let neg_expr = -expr;
        let expected = Expr::Mul(
            Box::new(Expr::Const(-1.0)),
            Box::new(Expr::Var("x".to_string())),
        );
        assert_eq!(neg_expr, expected);
    }

    #[test]
    fn test_symbols() {
        let vars = Expr::Symbols("eg, e0 ,c,");
        assert_eq!(
            vars,
            vec![
                Expr::Var("eg".to_string()),
                Expr::Var("e0".to_string()),
                Expr::Var("c".to_string())
            ]
        );
        let (a_p, c_p) = symbols!(a_p, c_p);
        assert_eq!(a_p, Expr::Var("a_p".to_string()));
        assert_eq!(c_p, Expr::Var("c_p".to_string()));
    }

    #[test]
    fn test_sqrt_is_half_power() {
        let x = Expr::Var("x".to_string());
        assert_eq!(x.clone().sqrt(), Expr::Pow(Box::new(x), Box::new(Expr::Const(0.5))));
    }

    #[test]
    fn test_substitute_variable() {
        let (x, y, z) = symbols!(x, y, z);
        let expr = x.clone() * y.clone() + x.clone().ln();
        let substituted = expr.substitute_variable("x", &(z.clone() + Expr::Const(1.0)));
        assert!(!substituted.contains_variable("x"));
        assert!(substituted.contains_variable("z"));
        let value = substituted.eval_expression(&["y", "z"], &[2.0, 1.0]).unwrap();
        assert_relative_eq!(value, 4.0 + 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_contains_variable_in_conditions() {
        let (x, y) = symbols!(x, y);
        let expr = Expr::piecewise(vec![
            (Expr::Const(1.0), x.greater_than(&y)),
            (Expr::Const(0.0), Condition::Always),
        ]);
        assert!(expr.contains_variable("x"));
        assert!(expr.contains_variable("y"));
        assert!(!expr.contains_variable("z"));
        assert_eq!(expr.all_arguments_are_variables(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_node_count() {
        let (x, y) = symbols!(x, y);
        assert_eq!(x.node_count(), 1);
        assert_eq!((x.clone() + y.clone()).node_count(), 3);
        assert_eq!((x.clone() + y.clone()).ln().node_count(), 4);
        let pw = Expr::piecewise(vec![
            (x.clone(), x.greater_than(&y)),
            (y.clone(), Condition::Always),
        ]);
        assert_eq!(pw.node_count(), 5);
    }

    #[test]
    fn test_display() {
        let (x, y) = symbols!(x, y);
        let expr = (x.clone() + Expr::Const(2.0)) * y.clone().ln();
        assert_eq!(expr.to_string(), "((x + 2) * ln(y))");
        let pw = Expr::piecewise(vec![
            (x.clone(), x.greater_than(&y)),
            (Expr::Const(0.0), Condition::Always),
        ]);
        assert_eq!(pw.to_string(), "Piecewise((x, x > y), (0, True))");
    }

    //___________________________________DIFFERENTIATION____________________________________

    #[test]
    fn test_diff_polynomial() {
        let x = Expr::Var("x".to_string());
        let f = x.clone().pow(Expr::Const(2.0));
        let df_dx = f.diff("x").simplify_();
        assert_eq!(df_dx, Expr::Const(2.0) * x.clone());
        assert_eq!(f.diff("y").simplify_(), Expr::Const(0.0));
    }

    #[test]
    fn test_diff_product_and_quotient() {
        let (x, y) = symbols!(x, y);
        let f = x.clone() * y.clone();
        assert_eq!(f.diff("x").simplify_(), y.clone());
        let g = Expr::Const(1.0) / x.clone();
        let dg = g.diff("x");
        assert_relative_eq!(
            dg.eval_expression(&["x"], &[2.0]).unwrap(),
            -0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_diff_ln_and_atan() {
        let x = Expr::Var("x".to_string());
        let f = (x.clone() * Expr::Const(3.0)).ln();
        assert_relative_eq!(
            f.diff("x").eval_expression(&["x"], &[2.0]).unwrap(),
            0.5,
            epsilon = 1e-12
        );
        let g = x.clone().atan();
        assert_relative_eq!(
            g.diff("x").eval_expression(&["x"], &[2.0]).unwrap(),
            0.2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_diff_general_power() {
        let (x, y) = symbols!(x, y);
        // constant exponent: no logarithmic part
        let f = x.clone().pow(y.clone());
        let df_dx = f.diff("x");
        assert!(!matches!(df_dx, Expr::Add(_, _)));
        assert_relative_eq!(
            df_dx.eval_expression(&["x", "y"], &[2.0, 3.0]).unwrap(),
            12.0,
            epsilon = 1e-12
        );
        // variable exponent: d/dy x^y = x^y * ln(x)
        let df_dy = f.diff("y");
        assert_relative_eq!(
            df_dy.eval_expression(&["x", "y"], &[2.0, 3.0]).unwrap(),
            8.0 * 2.0_f64.ln(),
            epsilon = 1e-12
        );
        // both: d/dx x^x = x^x (ln x + 1)
        let g = x.clone().pow(x.clone());
        assert_relative_eq!(
            g.diff("x").eval_expression(&["x"], &[2.0]).unwrap(),
            4.0 * (2.0_f64.ln() + 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_diff_piecewise_keeps_conditions() {
        let (x, y) = symbols!(x, y);
        let f = Expr::piecewise(vec![
            (x.clone() * x.clone(), x.greater_than(&y)),
            (x.clone() * y.clone(), Condition::Always),
        ]);
        let df = f.diff("x").simplify_();
        match &df {
            Expr::Piecewise(branches) => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].1, x.greater_than(&y));
                assert_eq!(branches[1].1, Condition::Always);
                assert_eq!(branches[1].0, y.clone());
            }
            other => panic!("expected piecewise, got {}", other),
        }
        assert_relative_eq!(df.eval_expression(&["x", "y"], &[3.0, 1.0]).unwrap(), 6.0);
        assert_relative_eq!(df.eval_expression(&["x", "y"], &[3.0, 5.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_diff_multi_args_order() {
        let (x, y) = symbols!(x, y);
        let f = x.clone() * Expr::Const(2.0) + y.clone() * Expr::Const(3.0);
        let grads: Vec<Expr> = f
            .diff_multi_args(&["y", "x"])
            .iter()
            .map(|d| d.simplify_())
            .collect();
        assert_eq!(grads, vec![Expr::Const(3.0), Expr::Const(2.0)]);
    }

    //___________________________________EVALUATION____________________________________

    #[test]
    fn test_eval_expression() {
        let (x, y) = symbols!(x, y);
        let expr = x.clone().pow(Expr::Const(2.0)) + y.clone().sqrt() - Expr::pi();
        let value = expr.eval_expression(&["x", "y"], &[3.0, 4.0]).unwrap();
        assert_relative_eq!(value, 11.0 - f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_eval_errors() {
        let (x, y) = symbols!(x, y);
        let expr = x.clone() + y.clone();
        assert_eq!(
            expr.eval_expression(&["x"], &[1.0]),
            Err(EvalError::UnboundVariable("y".to_string()))
        );
        assert_eq!(
            expr.eval_expression(&["x", "y"], &[1.0]),
            Err(EvalError::BindingMismatch { vars: 2, values: 1 })
        );
    }

    #[test]
    fn test_eval_piecewise_is_lazy() {
        let (x, y) = symbols!(x, y);
        // the second branch uses an unbound variable and must not be visited
        let expr = Expr::piecewise(vec![
            (x.clone(), x.greater_than(&Expr::Const(0.0))),
            (y.clone(), Condition::Always),
        ]);
        assert_eq!(expr.eval_expression(&["x"], &[2.0]), Ok(2.0));
        assert!(expr.eval_expression(&["x"], &[-2.0]).is_err());

        let open = Expr::piecewise(vec![(x.clone(), x.greater_than(&Expr::Const(0.0)))]);
        assert!(open.eval_expression(&["x"], &[-1.0]).unwrap().is_nan());
    }
}
