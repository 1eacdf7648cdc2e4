//! # Tauc-Lorentz dielectric function
//!
//! Symbolic construction of the real part `eps1` and the imaginary part `eps2` of the
//! Tauc-Lorentz permittivity as functions of the photon energy `en`, and of their
//! partial derivatives with respect to the model parameters.
//!
//! ## Model parameters
//! - `eg` - optical band gap
//! - `a` - oscillator amplitude
//! - `e0` - resonance (peak transition) energy
//! - `c` - broadening
//!
//! `eps2` vanishes below the gap. `eps1` is the Kramers-Kronig transform of `eps2` and is
//! written as the sum of five closed-form terms; the high-frequency offset `eps_inf` is
//! not part of it and is added by the consumer of the generated code.
//!
//! ## Example
//! ```rust, ignore
//! let symbols = TaucLorentzSymbols::new();
//! let model = tauc_lorentz_epsilon(&symbols);
//! let bundle = EpsilonBundle::derive(&model);
//! assert_eq!(bundle.targets().len(), 10);
//! ```

use crate::symbolic::symbolic_engine::{Condition, Expr};
use log::info;

/// Parameters the derivatives are taken with respect to, in output order.
pub const DIFF_PARAMETERS: [&str; 4] = ["eg", "a", "e0", "c"];

/// Symbolic scalars of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct TaucLorentzSymbols {
    pub eg: Expr,
    pub e0: Expr,
    pub c: Expr,
    pub en: Expr,
    pub a: Expr,
    /// reserved for the consumer of the generated code, never part of a returned expression
    pub eps_inf: Expr,
}

impl Default for TaucLorentzSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl TaucLorentzSymbols {
    pub fn new() -> Self {
        let (eg, e0, c, en, a, eps_inf) = crate::symbols!(eg, e0, c, en, a, eps_inf);
        TaucLorentzSymbols {
            eg,
            e0,
            c,
            en,
            a,
            eps_inf,
        }
    }

    /// Names the model expressions are evaluated over.
    pub fn variable_names() -> [&'static str; 5] {
        ["eg", "e0", "c", "en", "a"]
    }
}

/// Real and imaginary part of the permittivity.
#[derive(Clone, Debug, PartialEq)]
pub struct DielectricModel {
    pub eps1: Expr,
    pub eps2: Expr,
}

fn sq(x: &Expr) -> Expr {
    x.clone().pow(Expr::Const(2.0))
}

fn num(value: f64) -> Expr {
    Expr::Const(value)
}

/// Builds `eps1` and `eps2`.
pub fn tauc_lorentz_epsilon(symbols: &TaucLorentzSymbols) -> DielectricModel {
    let TaucLorentzSymbols { eg, e0, c, en, a, .. } = symbols;
    let pi = Expr::pi();

    let alpha2 = num(4.0) * sq(e0) - sq(c);
    let alpha = alpha2.clone().sqrt();
    let gamma2 = sq(e0) - sq(c) / num(2.0);

    let a_ln = (sq(eg) - sq(e0)) * sq(en) + sq(eg) * sq(c)
        - sq(e0) * (sq(e0) + num(3.0) * sq(eg));
    let a_tan = (sq(en) - sq(e0)) * (sq(e0) + sq(eg)) + sq(eg) * sq(c);
    let csi4 = sq(&(sq(en) - gamma2.clone())) + alpha2 * sq(c) / num(4.0);

    // ln|en - eg| with the branch chosen explicitly
    let log_abs = Expr::piecewise(vec![
        ((en.clone() - eg.clone()).ln(), en.greater_than(eg)),
        ((eg.clone() - en.clone()).ln(), Condition::Always),
    ]);
    let ln_sum = (en.clone() + eg.clone()).ln();

    let t1 = (a.clone() * c.clone()) / (pi.clone() * csi4.clone())
        * a_ln
        / (num(2.0) * alpha.clone() * e0.clone())
        * ((sq(e0) + sq(eg) + alpha.clone() * eg.clone())
            / (sq(e0) + sq(eg) - alpha.clone() * eg.clone()))
        .ln();

    let t2 = -a.clone() / (pi.clone() * csi4.clone()) * a_tan / e0.clone()
        * (pi.clone() - ((num(2.0) * eg.clone() + alpha.clone()) / c.clone()).atan()
            + ((num(-2.0) * eg.clone() + alpha.clone()) / c.clone()).atan());

    let t3 = num(2.0) * (a.clone() * e0.clone()) / (pi.clone() * csi4.clone() * alpha.clone())
        * eg.clone()
        * (sq(en) - gamma2.clone())
        * (pi.clone()
            + num(2.0)
                * ((num(2.0) * (gamma2 - sq(eg))) / (alpha.clone() * c.clone())).atan());

    let t4 = -(a.clone() * e0.clone() * c.clone()) / (pi.clone() * csi4.clone())
        * (sq(en) + sq(eg))
        / en.clone()
        * (log_abs.clone() - ln_sum.clone());

    let t5 = (num(2.0) * a.clone() * e0.clone() * c.clone()) / (pi.clone() * csi4)
        * eg.clone()
        * (log_abs + ln_sum - (sq(&(sq(e0) - sq(eg))) + sq(eg) * sq(c)).sqrt().ln());

    let eps1 = t1 + t2 + t3 + t4 + t5;

    let eps2 = Expr::piecewise(vec![
        (
            (a.clone() * e0.clone() * c.clone() * sq(&(en.clone() - eg.clone())))
                / (sq(&(sq(en) - sq(e0))) + sq(c) * sq(en))
                / en.clone(),
            en.greater_than(eg),
        ),
        (num(0.0), Condition::Always),
    ]);

    info!(
        "Tauc-Lorentz model built: eps1 {} nodes, eps2 {} nodes",
        eps1.node_count(),
        eps2.node_count()
    );
    DielectricModel { eps1, eps2 }
}

/// `eps1`, `eps2` and their derivatives with respect to `DIFF_PARAMETERS`.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonBundle {
    pub eps1: Expr,
    pub eps2: Expr,
    /// d eps1 / d p for p in `DIFF_PARAMETERS`
    pub der_eps1: Vec<Expr>,
    /// d eps2 / d p for p in `DIFF_PARAMETERS`
    pub der_eps2: Vec<Expr>,
}

impl EpsilonBundle {
    /// Differentiates both parts; derivatives get the light simplification only.
    pub fn derive(model: &DielectricModel) -> Self {
        let derive_all = |expr: &Expr| -> Vec<Expr> {
            expr.diff_multi_args(&DIFF_PARAMETERS)
                .iter()
                .map(|d| d.simplify_())
                .collect()
        };
        let der_eps1 = derive_all(&model.eps1);
        let der_eps2 = derive_all(&model.eps2);
        info!(
            "derivatives: eps1 {} nodes, eps2 {} nodes",
            der_eps1.iter().map(|d| d.node_count()).sum::<usize>(),
            der_eps2.iter().map(|d| d.node_count()).sum::<usize>()
        );
        EpsilonBundle {
            eps1: model.eps1.clone(),
            eps2: model.eps2.clone(),
            der_eps1,
            der_eps2,
        }
    }

    /// `[eps1, eps2, d eps1/d eg, .., d eps1/d c, d eps2/d eg, .., d eps2/d c]`
    pub fn targets(&self) -> Vec<Expr> {
        let mut targets = Vec::with_capacity(2 + self.der_eps1.len() + self.der_eps2.len());
        targets.push(self.eps1.clone());
        targets.push(self.eps2.clone());
        targets.extend(self.der_eps1.iter().cloned());
        targets.extend(self.der_eps2.iter().cloned());
        targets
    }
}
