//! # Symbolic Expression Simplification Module
//!
//! Two levels of algebraic simplification for symbolic expressions.
//!
//! ## Simplification Strategy
//!
//! 1. **Light pass** (`simplify_`): constant folding and the additive/multiplicative
//!    identities. This is what derivatives go through.
//! 2. **Full pass** (`simplify`): repeats the light pass together with power merging
//!    (`x^a * x^b = x^(a+b)`, `x^a / x^b = x^(a-b)`) until the tree stops changing.
//!
//! ## Key Features
//!
//! - **Single Traversal per Pass**: children are simplified first, then the node is
//!   rebuilt by a combine step that only looks at already simplified children
//! - **Constant Collection**: constants move to the left of products and nested
//!   constant factors are merged, `(2 * x) * 3 = 6 * x`
//! - **Sign Normalization**: `x + (-2 * y)` becomes `x - 2 * y`
//! - **Piecewise Pruning**: branches after an always-true condition are dropped and
//!   branches with a constant-false condition are removed

use crate::symbolic::symbolic_engine::{Condition, Expr};

/// Upper bound on full-pass iterations.
const MAX_SIMPLIFY_ROUNDS: usize = 8;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Light simplification: constant folding and basic identities.
    ///
    /// ## Rules
    /// - `a + b`, `a - b`, `a * b`, `a / b`, `a ^ b` on constants are evaluated
    /// - `x + 0 = x`, `x - 0 = x`, `0 - x = -1 * x`, `x - x = 0`
    /// - `x * 0 = 0`, `x * 1 = x`, `x * c = c * x`, `c1 * (c2 * x) = (c1 * c2) * x`
    /// - `0 / x = 0`, `x / 1 = x`, `x / x = 1`
    /// - `x ^ 0 = 1`, `x ^ 1 = x`, `1 ^ x = 1`, `(x ^ a) ^ n = x ^ (a * n)` for integer n
    /// - `ln(1) = 0`, `arctg(0) = 0`
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let expr = (x.clone() * Expr::Const(1.0)) + Expr::Const(0.0);
    /// assert_eq!(expr.simplify_(), x);
    /// ```
    pub fn simplify_(&self) -> Expr {
        self.simplify_pass(false)
    }

    /// Full simplification: the light rules plus power merging, iterated to a fixpoint.
    ///
    /// Every rewrite preserves the value of the expression wherever the original is
    /// defined.
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_pass(true);
        for _ in 1..MAX_SIMPLIFY_ROUNDS {
            let next = current.simplify_pass(true);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn simplify_pass(&self, powers: bool) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                simplify_add(lhs.simplify_pass(powers), rhs.simplify_pass(powers))
            }
            Expr::Sub(lhs, rhs) => {
                simplify_sub(lhs.simplify_pass(powers), rhs.simplify_pass(powers))
            }
            Expr::Mul(lhs, rhs) => simplify_mul(
                lhs.simplify_pass(powers),
                rhs.simplify_pass(powers),
                powers,
            ),
            Expr::Div(lhs, rhs) => simplify_div(
                lhs.simplify_pass(powers),
                rhs.simplify_pass(powers),
                powers,
            ),
            Expr::Pow(base, exp) => {
                simplify_pow(base.simplify_pass(powers), exp.simplify_pass(powers))
            }
            Expr::Ln(expr) => match expr.simplify_pass(powers) {
                Expr::Const(1.0) => Expr::Const(0.0),
                Expr::Const(val) if val > 0.0 => Expr::Const(val.ln()),
                inner => Expr::Ln(Box::new(inner)),
            },
            Expr::arctg(expr) => match expr.simplify_pass(powers) {
                Expr::Const(val) => Expr::Const(val.atan()),
                inner => Expr::arctg(Box::new(inner)),
            },
            Expr::Piecewise(branches) => simplify_piecewise(branches, powers),
        }
    }
}

fn simplify_add(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b), // (a) + (b) = (a + b)
        (Expr::Const(0.0), _) => rhs,                           // 0 + x = x
        (_, Expr::Const(0.0)) => lhs,                           // x + 0 = x
        // x + (-c * y) = x - c * y
        (_, Expr::Mul(coeff, term)) if is_negative_const(coeff) => {
            let negated = simplify_mul(Expr::Const(-coeff_value(coeff)), *term.clone(), false);
            simplify_sub(lhs, negated)
        }
        // (-1 * y) + x = x - y
        (Expr::Mul(coeff, term), _) if matches!(coeff.as_ref(), Expr::Const(-1.0)) => {
            simplify_sub(rhs, *term.clone())
        }
        _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_sub(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b), // (a) - (b) = (a - b)
        (_, Expr::Const(0.0)) => lhs,                           // x - 0 = x
        (Expr::Const(0.0), _) => simplify_mul(Expr::Const(-1.0), rhs, false), // 0 - x = -x
        _ if lhs == rhs => Expr::Const(0.0),                    // x - x = 0
        // x - (-c * y) = x + c * y
        (_, Expr::Mul(coeff, term)) if is_negative_const(coeff) => {
            let negated = simplify_mul(Expr::Const(-coeff_value(coeff)), *term.clone(), false);
            Expr::Add(Box::new(lhs), Box::new(negated))
        }
        _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_mul(lhs: Expr, rhs: Expr, powers: bool) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b), // (a) * (b) = (a * b)
        (Expr::Const(0.0), _) | (_, Expr::Const(0.0)) => Expr::Const(0.0), // 0 * x = 0
        (Expr::Const(1.0), _) => rhs,                           // 1 * x = x
        (_, Expr::Const(1.0)) => lhs,                           // x * 1 = x
        // x * c = c * x
        (_, Expr::Const(_)) => simplify_mul(rhs, lhs, powers),
        // c1 * (c2 * x) = (c1 * c2) * x
        (Expr::Const(c1), Expr::Mul(inner_lhs, inner_rhs)) if is_const(inner_lhs) => {
            simplify_mul(Expr::Const(c1 * coeff_value(inner_lhs)), *inner_rhs.clone(), powers)
        }
        // (c * x) * y = c * (x * y)
        (Expr::Mul(inner_lhs, inner_rhs), _) if is_const(inner_lhs) => {
            let rest = simplify_mul(*inner_rhs.clone(), rhs, powers);
            simplify_mul(*inner_lhs.clone(), rest, powers)
        }
        // x * (c * y) = c * (x * y)
        (_, Expr::Mul(inner_lhs, inner_rhs)) if is_const(inner_lhs) => {
            let rest = simplify_mul(lhs.clone(), *inner_rhs.clone(), powers);
            simplify_mul(*inner_lhs.clone(), rest, powers)
        }
        _ if powers => merge_product_powers(lhs, rhs),
        _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_div(lhs: Expr, rhs: Expr, powers: bool) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b), // (a) / (b) = (a / b)
        (Expr::Const(0.0), _) => Expr::Const(0.0), // 0 / x = 0
        (_, Expr::Const(1.0)) => lhs,              // x / 1 = x
        _ if lhs == rhs && !is_const(&lhs) => Expr::Const(1.0), // x / x = 1
        // (c1 * x) / c2 = (c1 / c2) * x
        (Expr::Mul(inner_lhs, inner_rhs), Expr::Const(c2)) if is_const(inner_lhs) && *c2 != 0.0 => {
            simplify_mul(Expr::Const(coeff_value(inner_lhs) / c2), *inner_rhs.clone(), powers)
        }
        _ if powers => merge_quotient_powers(lhs, rhs),
        _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    match (&base, &exp) {
        (Expr::Const(a), Expr::Const(b)) => {
            let folded = a.powf(*b);
            if folded.is_finite() {
                Expr::Const(folded)
            } else {
                Expr::Pow(Box::new(base), Box::new(exp))
            }
        }
        (_, Expr::Const(0.0)) => Expr::Const(1.0), // x ^ 0 = 1
        (_, Expr::Const(1.0)) => base,             // x ^ 1 = x
        (Expr::Const(1.0), _) => Expr::Const(1.0), // 1 ^ x = 1
        // (x ^ a) ^ n = x ^ (a * n)
        (Expr::Pow(inner_base, inner_exp), Expr::Const(n))
            if n.fract() == 0.0 && is_const(inner_exp) =>
        {
            simplify_pow(*inner_base.clone(), Expr::Const(coeff_value(inner_exp) * n))
        }
        _ => Expr::Pow(Box::new(base), Box::new(exp)),
    }
}

fn simplify_piecewise(branches: &[(Expr, Condition)], powers: bool) -> Expr {
    let mut kept: Vec<(Expr, Condition)> = Vec::with_capacity(branches.len());
    for (value, cond) in branches {
        let value = value.simplify_pass(powers);
        let cond = match cond {
            Condition::Greater(lhs, rhs) => {
                match (lhs.simplify_pass(powers), rhs.simplify_pass(powers)) {
                    (Expr::Const(l), Expr::Const(r)) if l > r => Condition::Always,
                    (Expr::Const(_), Expr::Const(_)) => continue,
                    (l, r) => Condition::Greater(Box::new(l), Box::new(r)),
                }
            }
            Condition::Always => Condition::Always,
        };
        let closes = cond == Condition::Always;
        kept.push((value, cond));
        if closes {
            break;
        }
    }
    let closed = matches!(kept.last(), Some((_, Condition::Always)));
    if closed {
        let first = &kept[0].0;
        if kept.iter().all(|(value, _)| value == first) {
            return first.clone();
        }
    }
    Expr::Piecewise(kept)
}

//___________________________________POWER MERGING____________________________________

/// Splits `x ^ e` into (x, e); any other expression is `x ^ 1`.
fn as_power(expr: &Expr) -> (Expr, Expr) {
    match expr {
        Expr::Pow(base, exp) => (*base.clone(), *exp.clone()),
        _ => (expr.clone(), Expr::Const(1.0)),
    }
}

/// x^a * x^b = x^(a+b), x * x^a = x^(1+a), x * x = x^2
fn merge_product_powers(lhs: Expr, rhs: Expr) -> Expr {
    if !is_const(&lhs) && !is_const(&rhs) {
        let (base1, exp1) = as_power(&lhs);
        let (base2, exp2) = as_power(&rhs);
        if base1 == base2 {
            return simplify_pow(base1, simplify_add(exp1, exp2));
        }
    }
    Expr::Mul(Box::new(lhs), Box::new(rhs))
}

/// x^a / x^b = x^(a-b), x / x^a = x^(1-a), x^a / x = x^(a-1)
fn merge_quotient_powers(lhs: Expr, rhs: Expr) -> Expr {
    if !is_const(&lhs) && !is_const(&rhs) {
        let (base1, exp1) = as_power(&lhs);
        let (base2, exp2) = as_power(&rhs);
        if base1 == base2 {
            return simplify_pow(base1, simplify_sub(exp1, exp2));
        }
    }
    Expr::Div(Box::new(lhs), Box::new(rhs))
}

fn is_negative_const(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(val) if *val < 0.0)
}

fn coeff_value(expr: &Expr) -> f64 {
    match expr {
        Expr::Const(val) => *val,
        _ => 1.0,
    }
}

fn is_const(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(_))
}
