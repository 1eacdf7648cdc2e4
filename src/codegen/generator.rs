//! # Code generator
//!
//! Runs the whole pipeline: builds the dielectric model and the parameter transform,
//! differentiates, eliminates common subexpressions, prints C++ and fills the template.
//!
//! ```rust, ignore
//! let generator = CodeGenerator::new(GeneratorConfig::default());
//! let document = generator.render(&std::fs::read_to_string("tauc_lorentz.cpp.in")?)?;
//! ```

use crate::codegen::cxx_printer::{EmitError, cxx_code};
use crate::codegen::template::{Placeholder, Template, TemplateError};
use crate::models::parameters::parameters_jacobian;
use crate::models::tauc_lorentz::{EpsilonBundle, TaucLorentzSymbols, tauc_lorentz_epsilon};
use crate::symbolic::symbolic_cse::{Cse, CseResult};
use crate::symbolic::symbolic_engine::EvalError;
use itertools::Itertools;
use log::{debug, info};
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors of a generator run.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("code emission failed: {0}")]
    Emit(#[from] EmitError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Output conventions of the generated code.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// prefix of common subexpression names
    pub cse_prefix: String,
    /// declaration of a common subexpression
    pub definition_decl: String,
    /// declaration of a Jacobian entry
    pub jacobian_decl: String,
    /// Jacobian entries are named `<prefix><row><column>`, 1-based
    pub jacobian_prefix: String,
    pub log_level: LevelFilter,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            cse_prefix: "x".to_string(),
            definition_decl: "const auto".to_string(),
            jacobian_decl: "const double".to_string(),
            jacobian_prefix: "dp".to_string(),
            log_level: LevelFilter::Warn,
        }
    }
}

/// Optimized expression sets, ready for printing.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragments {
    /// `[eps1, eps2, d eps1 / d (eg, a, e0, c), d eps2 / d (eg, a, e0, c)]`
    pub epsilon: CseResult,
    /// the nine Jacobian entries, row-major
    pub parameters: CseResult,
}

impl Fragments {
    /// Evaluates the optimized permittivity set at `values`, ordered as
    /// `TaucLorentzSymbols::variable_names()`.
    pub fn evaluate_epsilon(&self, values: &[f64]) -> Result<Vec<f64>, CodegenError> {
        Ok(self
            .epsilon
            .evaluate(&TaucLorentzSymbols::variable_names(), values)?)
    }
}

const EPSILON_TARGETS: [Placeholder; 10] = [
    Placeholder::Eps1,
    Placeholder::Eps2,
    Placeholder::DerEps1Eg,
    Placeholder::DerEps1A,
    Placeholder::DerEps1E0,
    Placeholder::DerEps1C,
    Placeholder::DerEps2Eg,
    Placeholder::DerEps2A,
    Placeholder::DerEps2E0,
    Placeholder::DerEps2C,
];

#[derive(Clone, Debug, Default)]
pub struct CodeGenerator {
    pub config: GeneratorConfig,
}

impl CodeGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        CodeGenerator { config }
    }

    /// Derives both expression sets and eliminates their common subexpressions.
    pub fn fragments(&self) -> Fragments {
        let cse = Cse::with_prefix(&self.config.cse_prefix);

        let model = tauc_lorentz_epsilon(&TaucLorentzSymbols::new());
        let targets = EpsilonBundle::derive(&model).targets();
        let epsilon = cse.optimize(&targets);
        info!(
            "epsilon: {} nodes reduced to {} with {} definitions",
            targets.iter().map(|e| e.node_count()).sum::<usize>(),
            epsilon.node_count(),
            epsilon.definitions.len()
        );

        let jacobian = parameters_jacobian().flat_row_major();
        let parameters = cse.optimize(&jacobian);
        info!(
            "parameter jacobian: {} nodes reduced to {} with {} definitions",
            jacobian.iter().map(|e| e.node_count()).sum::<usize>(),
            parameters.node_count(),
            parameters.definitions.len()
        );
        Fragments {
            epsilon,
            parameters,
        }
    }

    fn definition_lines(&self, result: &CseResult) -> Result<String, EmitError> {
        let lines: Vec<String> = result
            .definitions
            .iter()
            .map(|(name, expr)| {
                Ok(format!(
                    "{} {} = {};",
                    self.config.definition_decl,
                    name,
                    cxx_code(expr)?
                ))
            })
            .collect::<Result<_, EmitError>>()?;
        Ok(lines.iter().join("\n"))
    }

    fn jacobian_lines(&self, result: &CseResult) -> Result<String, EmitError> {
        let lines: Vec<String> = result
            .expressions
            .iter()
            .enumerate()
            .map(|(k, expr)| {
                Ok(format!(
                    "{} {}{}{} = {};",
                    self.config.jacobian_decl,
                    self.config.jacobian_prefix,
                    k / 3 + 1,
                    k % 3 + 1,
                    cxx_code(expr)?
                ))
            })
            .collect::<Result<_, EmitError>>()?;
        Ok(lines.iter().join("\n"))
    }

    /// Printed code for every placeholder.
    pub fn placeholder_values(
        &self,
        fragments: &Fragments,
    ) -> Result<HashMap<Placeholder, String>, EmitError> {
        let mut values = HashMap::new();
        values.insert(
            Placeholder::EpsilonDefs,
            self.definition_lines(&fragments.epsilon)?,
        );
        for (placeholder, expr) in EPSILON_TARGETS.iter().zip(&fragments.epsilon.expressions) {
            values.insert(*placeholder, cxx_code(expr)?);
        }
        values.insert(
            Placeholder::ParametersDefs,
            self.definition_lines(&fragments.parameters)?,
        );
        values.insert(
            Placeholder::ParametersJacob,
            self.jacobian_lines(&fragments.parameters)?,
        );
        for (placeholder, value) in &values {
            debug!("{}: {} bytes", placeholder, value.len());
        }
        Ok(values)
    }

    /// Renders `template_text` with the generated code.
    ///
    /// The template is validated before any derivation work.
    pub fn render(&self, template_text: &str) -> Result<String, CodegenError> {
        let template = Template::new(template_text)?;
        template.validate()?;
        let fragments = self.fragments();
        let values = self.placeholder_values(&fragments)?;
        Ok(template.substitute(&values)?)
    }

    /// Reads the template at `path` and renders it.
    pub fn render_file(&self, path: &Path) -> Result<String, CodegenError> {
        let template_text = fs::read_to_string(path)?;
        info!("template {} read, {} bytes", path.display(), template_text.len());
        self.render(&template_text)
    }
}
