//! Closed-form models the code generator works on.
/// Tauc-Lorentz permittivity and its parameter derivatives
pub mod tauc_lorentz;
/// constrained re-parameterization of the oscillator and its Jacobian
pub mod parameters;
