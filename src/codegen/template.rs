//! # Template renderer
//!
//! Substitutes generated code into a text template. Placeholders are written `$name` or
//! `${name}`; `$$` stands for a literal `$`. Only the names of [`Placeholder`] are
//! recognized and every one of them must occur in the template at least once.

use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Placeholders of the code template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, AsRefStr, Display,
)]
pub enum Placeholder {
    /// common subexpression definitions of the permittivity block
    #[strum(serialize = "epsilon_defs")]
    EpsilonDefs,
    #[strum(serialize = "eps1")]
    Eps1,
    #[strum(serialize = "eps2")]
    Eps2,
    #[strum(serialize = "der_eps1_eg")]
    DerEps1Eg,
    #[strum(serialize = "der_eps1_a")]
    DerEps1A,
    #[strum(serialize = "der_eps1_e0")]
    DerEps1E0,
    #[strum(serialize = "der_eps1_c")]
    DerEps1C,
    #[strum(serialize = "der_eps2_eg")]
    DerEps2Eg,
    #[strum(serialize = "der_eps2_a")]
    DerEps2A,
    #[strum(serialize = "der_eps2_e0")]
    DerEps2E0,
    #[strum(serialize = "der_eps2_c")]
    DerEps2C,
    /// common subexpression definitions of the parameter Jacobian block
    #[strum(serialize = "parameters_defs")]
    ParametersDefs,
    /// the nine Jacobian entry declarations
    #[strum(serialize = "parameters_jacob")]
    ParametersJacob,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder `${name}` on line {line}")]
    UnknownPlaceholder { name: String, line: usize },
    #[error("invalid placeholder on line {line}, column {column}")]
    InvalidPlaceholder { line: usize, column: usize },
    #[error("placeholder `${0}` does not occur in the template")]
    MissingPlaceholder(Placeholder),
    #[error("no value given for placeholder `${0}`")]
    MissingValue(Placeholder),
    #[error("placeholder pattern: {0}")]
    Pattern(String),
}

impl From<regex::Error> for TemplateError {
    fn from(err: regex::Error) -> Self {
        TemplateError::Pattern(err.to_string())
    }
}

/// One `$` occurrence in the template.
enum Token<'t> {
    Escaped,
    Named(&'t str),
    Invalid,
}

/// A parsed text template.
#[derive(Debug, Clone)]
pub struct Template {
    text: String,
    pattern: Regex,
}

impl Template {
    pub fn new(text: &str) -> Result<Self, TemplateError> {
        let pattern = Regex::new(
            r"(?i)\$(?:(?P<escaped>\$)|(?P<named>[_a-z][_a-z0-9]*)|\{(?P<braced>[_a-z][_a-z0-9]*)\}|(?P<invalid>))",
        )?;
        Ok(Template {
            text: text.to_string(),
            pattern,
        })
    }

    fn token<'t>(caps: &Captures<'t>) -> Token<'t> {
        if caps.name("escaped").is_some() {
            Token::Escaped
        } else if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
            Token::Named(name.as_str())
        } else {
            Token::Invalid
        }
    }

    /// 1-based line and column of a byte offset.
    fn position(&self, offset: usize) -> (usize, usize) {
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
        (line, column)
    }

    fn check_name(&self, name: &str, offset: usize) -> Result<Placeholder, TemplateError> {
        name.parse::<Placeholder>()
            .map_err(|_| TemplateError::UnknownPlaceholder {
                name: name.to_string(),
                line: self.position(offset).0,
            })
    }

    /// Placeholders used by the template, in declaration order.
    pub fn placeholders(&self) -> Result<BTreeSet<Placeholder>, TemplateError> {
        let mut found = BTreeSet::new();
        for caps in self.pattern.captures_iter(&self.text) {
            let offset = caps.get(0).map_or(0, |m| m.start());
            match Self::token(&caps) {
                Token::Escaped => {}
                Token::Named(name) => {
                    found.insert(self.check_name(name, offset)?);
                }
                Token::Invalid => {
                    let (line, column) = self.position(offset);
                    return Err(TemplateError::InvalidPlaceholder { line, column });
                }
            }
        }
        Ok(found)
    }

    /// Checks that the template uses only known, well-formed placeholders and all of them.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let used = self.placeholders()?;
        match Placeholder::iter().find(|placeholder| !used.contains(placeholder)) {
            Some(missing) => Err(TemplateError::MissingPlaceholder(missing)),
            None => Ok(()),
        }
    }

    /// Replaces every placeholder by its value.
    ///
    /// Fails without output if the template uses an unknown or malformed placeholder,
    /// misses one of the placeholders, or `values` has no entry for one of them.
    pub fn substitute(&self, values: &HashMap<Placeholder, String>) -> Result<String, TemplateError> {
        self.validate()?;
        if let Some(missing) = Placeholder::iter().find(|placeholder| !values.contains_key(placeholder)) {
            return Err(TemplateError::MissingValue(missing));
        }

        let mut out = String::with_capacity(self.text.len() + values.values().map(|v| v.len()).sum::<usize>());
        let mut last = 0;
        for caps in self.pattern.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&self.text[last..whole.start()]);
            match Self::token(&caps) {
                Token::Escaped => out.push('$'),
                Token::Named(name) => {
                    let placeholder = self.check_name(name, whole.start())?;
                    let value = values
                        .get(&placeholder)
                        .ok_or(TemplateError::MissingValue(placeholder))?;
                    out.push_str(value);
                }
                Token::Invalid => {
                    let (line, column) = self.position(whole.start());
                    return Err(TemplateError::InvalidPlaceholder { line, column });
                }
            }
            last = whole.end();
        }
        out.push_str(&self.text[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_template() -> String {
        Placeholder::iter()
            .map(|p| format!("{} = ${{{}}};", p.as_ref(), p))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn all_values() -> HashMap<Placeholder, String> {
        Placeholder::iter()
            .map(|p| (p, format!("<{}>", p.as_ref())))
            .collect()
    }

    #[test]
    fn test_placeholder_names() {
        assert_eq!(Placeholder::iter().count(), 13);
        assert_eq!(Placeholder::DerEps1E0.as_ref(), "der_eps1_e0");
        assert_eq!(Placeholder::ParametersJacob.to_string(), "parameters_jacob");
        assert_eq!("epsilon_defs".parse::<Placeholder>(), Ok(Placeholder::EpsilonDefs));
        assert!("eps3".parse::<Placeholder>().is_err());
    }

    #[test]
    fn test_substitute_all() {
        let template = Template::new(&full_template()).unwrap();
        let rendered = template.substitute(&all_values()).unwrap();
        assert!(rendered.starts_with("epsilon_defs = <epsilon_defs>;\neps1 = <eps1>;"));
        assert!(rendered.ends_with("parameters_jacob = <parameters_jacob>;"));
        assert!(!rendered.contains('$'));
    }

    #[test]
    fn test_bare_names_and_escapes() {
        let text = format!("cost: $$5 $eps1+$eps2 ${{eps1}}x\n{}", full_template());
        let template = Template::new(&text).unwrap();
        let rendered = template.substitute(&all_values()).unwrap();
        assert!(rendered.starts_with("cost: $5 <eps1>+<eps2> <eps1>x\n"));
        // a name runs to the last identifier character
        let text = format!("$eps1_x\n{}", full_template());
        assert_eq!(
            Template::new(&text).unwrap().substitute(&all_values()),
            Err(TemplateError::UnknownPlaceholder {
                name: "eps1_x".to_string(),
                line: 1
            })
        );
    }

    #[test]
    fn test_unknown_placeholder() {
        let text = format!("{}\n$eps3", full_template());
        let template = Template::new(&text).unwrap();
        assert_eq!(
            template.substitute(&all_values()),
            Err(TemplateError::UnknownPlaceholder {
                name: "eps3".to_string(),
                line: 14
            })
        );
    }

    #[test]
    fn test_invalid_placeholder() {
        let text = format!("{}\nprice 5$ ", full_template());
        let template = Template::new(&text).unwrap();
        assert_eq!(
            template.substitute(&all_values()),
            Err(TemplateError::InvalidPlaceholder { line: 14, column: 8 })
        );
        let template = Template::new("${eps1").unwrap();
        assert_eq!(
            template.placeholders(),
            Err(TemplateError::InvalidPlaceholder { line: 1, column: 1 })
        );
    }

    #[test]
    fn test_missing_placeholder() {
        let text = full_template().replace("${eps2}", "0.0");
        let template = Template::new(&text).unwrap();
        assert_eq!(
            template.substitute(&all_values()),
            Err(TemplateError::MissingPlaceholder(Placeholder::Eps2))
        );
    }

    #[test]
    fn test_missing_value() {
        let template = Template::new(&full_template()).unwrap();
        let mut values = all_values();
        values.remove(&Placeholder::ParametersDefs);
        assert_eq!(
            template.substitute(&values),
            Err(TemplateError::MissingValue(Placeholder::ParametersDefs))
        );
    }
}
