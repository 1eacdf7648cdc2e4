//! # Common Subexpression Elimination
//!
//! Extracts subexpressions that occur more than once across a list of expressions into
//! named definitions, so generated code computes each of them once.
//!
//! ## Algorithm
//!
//! 1. **Interning**: every subtree of every input is hash-consed into a node table, so
//!    structurally equal subtrees share one id
//! 2. **Counting**: the inputs are walked in order; a node seen for the second time is
//!    counted again but not descended into, so the children of a repeated subtree are
//!    only counted for their occurrences outside of it
//! 3. **Rebuilding**: the inputs are rebuilt in postorder; a non-atomic node counted more
//!    than once is emitted as the next definition the first time it is reached and
//!    replaced by its name afterwards
//!
//! Definitions therefore reference only original variables and earlier definitions.
//! Names are `<prefix>0`, `<prefix>1`, ... skipping any name already used as a free
//! variable of the input.
//!
//! ## Example
//! ```rust, ignore
//! let (x, y) = symbols!(x, y);
//! let sum = x + y;
//! let result = Cse::new().optimize(&[sum.clone() * sum.clone(), sum.ln()]);
//! // result.definitions == [("x0", x + y)]
//! // result.expressions == [x0 * x0, ln(x0)]
//! ```

use crate::symbolic::symbolic_engine::{Condition, EvalError, Expr};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Node of the hash-consed expression graph, children referenced by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum NodeKey {
    Var(String),
    Const(u64),
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    Pow(usize, usize),
    Ln(usize),
    Atan(usize),
    Piecewise(Vec<(usize, CondKey)>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CondKey {
    Greater(usize, usize),
    Always,
}

impl NodeKey {
    fn is_atom(&self) -> bool {
        matches!(self, NodeKey::Var(_) | NodeKey::Const(_))
    }

    fn children(&self) -> Vec<usize> {
        match self {
            NodeKey::Var(_) | NodeKey::Const(_) => Vec::new(),
            NodeKey::Add(l, r)
            | NodeKey::Sub(l, r)
            | NodeKey::Mul(l, r)
            | NodeKey::Div(l, r)
            | NodeKey::Pow(l, r) => vec![*l, *r],
            NodeKey::Ln(e) | NodeKey::Atan(e) => vec![*e],
            NodeKey::Piecewise(branches) => {
                let mut ids = Vec::new();
                for (value, cond) in branches {
                    ids.push(*value);
                    if let CondKey::Greater(l, r) = cond {
                        ids.push(*l);
                        ids.push(*r);
                    }
                }
                ids
            }
        }
    }
}

/// Table of unique subtrees.
#[derive(Default)]
struct ExprGraph {
    nodes: Vec<NodeKey>,
    index: HashMap<NodeKey, usize>,
}

impl ExprGraph {
    fn intern(&mut self, expr: &Expr) -> usize {
        let key = match expr {
            Expr::Var(name) => NodeKey::Var(name.clone()),
            Expr::Const(val) => NodeKey::Const(val.to_bits()),
            Expr::Add(l, r) => NodeKey::Add(self.intern(l), self.intern(r)),
            Expr::Sub(l, r) => NodeKey::Sub(self.intern(l), self.intern(r)),
            Expr::Mul(l, r) => NodeKey::Mul(self.intern(l), self.intern(r)),
            Expr::Div(l, r) => NodeKey::Div(self.intern(l), self.intern(r)),
            Expr::Pow(l, r) => NodeKey::Pow(self.intern(l), self.intern(r)),
            Expr::Ln(e) => NodeKey::Ln(self.intern(e)),
            Expr::arctg(e) => NodeKey::Atan(self.intern(e)),
            Expr::Piecewise(branches) => {
                let mut keyed = Vec::with_capacity(branches.len());
                for (value, cond) in branches {
                    let value_id = self.intern(value);
                    let cond_key = match cond {
                        Condition::Greater(l, r) => CondKey::Greater(self.intern(l), self.intern(r)),
                        Condition::Always => CondKey::Always,
                    };
                    keyed.push((value_id, cond_key));
                }
                NodeKey::Piecewise(keyed)
            }
        };
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(key.clone());
        self.index.insert(key, id);
        id
    }

    fn count_occurrences(&self, roots: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.nodes.len()];
        let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.nodes[id].is_atom() {
                continue;
            }
            counts[id] += 1;
            if counts[id] > 1 {
                continue;
            }
            stack.extend(self.nodes[id].children().into_iter().rev());
        }
        counts
    }

    /// `-1 * atom` is as cheap as its operand and never becomes a definition.
    fn is_negated_atom(&self, id: usize) -> bool {
        match &self.nodes[id] {
            NodeKey::Mul(l, r) => {
                self.nodes[*l] == NodeKey::Const((-1.0f64).to_bits()) && self.nodes[*r].is_atom()
            }
            _ => false,
        }
    }
}

/// Result of common subexpression elimination.
#[derive(Clone, Debug, PartialEq)]
pub struct CseResult {
    /// Named definitions in dependency order
    pub definitions: Vec<(String, Expr)>,
    /// Input expressions rewritten in terms of the definitions
    pub expressions: Vec<Expr>,
}

impl CseResult {
    /// Evaluates definitions in order, then the rewritten expressions.
    pub fn evaluate(&self, vars: &[&str], values: &[f64]) -> Result<Vec<f64>, EvalError> {
        if vars.len() != values.len() {
            return Err(EvalError::BindingMismatch {
                vars: vars.len(),
                values: values.len(),
            });
        }
        let mut bindings: HashMap<String, f64> = vars
            .iter()
            .zip(values.iter())
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        for (name, definition) in &self.definitions {
            let value = definition.eval_map(&bindings)?;
            bindings.insert(name.clone(), value);
        }
        self.expressions
            .iter()
            .map(|expr| expr.eval_map(&bindings))
            .collect()
    }

    /// Total number of nodes over definitions and rewritten expressions.
    pub fn node_count(&self) -> usize {
        self.definitions
            .iter()
            .map(|(_, expr)| expr.node_count())
            .chain(self.expressions.iter().map(|expr| expr.node_count()))
            .sum()
    }
}

/// Common subexpression optimizer.
#[derive(Clone, Debug)]
pub struct Cse {
    prefix: String,
}

impl Default for Cse {
    fn default() -> Self {
        Self::new()
    }
}

impl Cse {
    pub fn new() -> Self {
        Self::with_prefix("x")
    }

    /// Optimizer naming its definitions `<prefix>0`, `<prefix>1`, ...
    pub fn with_prefix(prefix: &str) -> Self {
        Cse {
            prefix: prefix.to_string(),
        }
    }

    /// Extracts repeated subexpressions of `exprs` into definitions.
    pub fn optimize(&self, exprs: &[Expr]) -> CseResult {
        let mut graph = ExprGraph::default();
        let roots: Vec<usize> = exprs.iter().map(|expr| graph.intern(expr)).collect();
        let counts = graph.count_occurrences(&roots);

        let taken: HashSet<String> = exprs
            .iter()
            .flat_map(|expr| expr.all_arguments_are_variables())
            .collect();
        let mut rebuilder = Rebuilder {
            graph: &graph,
            counts: &counts,
            taken,
            prefix: &self.prefix,
            next_index: 0,
            names: HashMap::new(),
            definitions: Vec::new(),
        };
        let expressions: Vec<Expr> = roots.iter().map(|&id| rebuilder.rebuild(id)).collect();
        debug!(
            "cse: {} unique nodes, {} definitions for {} expressions",
            graph.nodes.len(),
            rebuilder.definitions.len(),
            exprs.len()
        );
        CseResult {
            definitions: rebuilder.definitions,
            expressions,
        }
    }
}

struct Rebuilder<'a> {
    graph: &'a ExprGraph,
    counts: &'a [usize],
    taken: HashSet<String>,
    prefix: &'a str,
    next_index: usize,
    names: HashMap<usize, String>,
    definitions: Vec<(String, Expr)>,
}

impl Rebuilder<'_> {
    fn fresh_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.prefix, self.next_index);
            self.next_index += 1;
            if !self.taken.contains(&name) {
                return name;
            }
        }
    }

    fn rebuild(&mut self, id: usize) -> Expr {
        if let Some(name) = self.names.get(&id) {
            return Expr::Var(name.clone());
        }
        let graph = self.graph;
        let node = &graph.nodes[id];
        let expr = match node {
            NodeKey::Var(name) => Expr::Var(name.clone()),
            NodeKey::Const(bits) => Expr::Const(f64::from_bits(*bits)),
            NodeKey::Add(l, r) => Expr::Add(Box::new(self.rebuild(*l)), Box::new(self.rebuild(*r))),
            NodeKey::Sub(l, r) => Expr::Sub(Box::new(self.rebuild(*l)), Box::new(self.rebuild(*r))),
            NodeKey::Mul(l, r) => Expr::Mul(Box::new(self.rebuild(*l)), Box::new(self.rebuild(*r))),
            NodeKey::Div(l, r) => Expr::Div(Box::new(self.rebuild(*l)), Box::new(self.rebuild(*r))),
            NodeKey::Pow(l, r) => Expr::Pow(Box::new(self.rebuild(*l)), Box::new(self.rebuild(*r))),
            NodeKey::Ln(e) => Expr::Ln(Box::new(self.rebuild(*e))),
            NodeKey::Atan(e) => Expr::arctg(Box::new(self.rebuild(*e))),
            NodeKey::Piecewise(branches) => {
                let mut rebuilt = Vec::with_capacity(branches.len());
                for (value, cond) in branches {
                    let value = self.rebuild(*value);
                    let cond = match cond {
                        CondKey::Greater(l, r) => Condition::Greater(
                            Box::new(self.rebuild(*l)),
                            Box::new(self.rebuild(*r)),
                        ),
                        CondKey::Always => Condition::Always,
                    };
                    rebuilt.push((value, cond));
                }
                Expr::Piecewise(rebuilt)
            }
        };
        if node.is_atom() || self.counts[id] < 2 || graph.is_negated_atom(id) {
            return expr;
        }
        let name = self.fresh_name();
        self.definitions.push((name.clone(), expr));
        self.names.insert(id, name.clone());
        Expr::Var(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols;
    use approx::assert_relative_eq;
    use rand::Rng;

    #[test]
    fn test_shared_subtree_extracted_once() {
        let (x, y) = symbols!(x, y);
        let sum = x.clone() + y.clone();
        let exprs = vec![sum.clone() * sum.clone(), sum.clone().ln()];
        let result = Cse::new().optimize(&exprs);
        let x0 = Expr::Var("x0".to_string());
        assert_eq!(result.definitions, vec![("x0".to_string(), sum)]);
        assert_eq!(
            result.expressions,
            vec![x0.clone() * x0.clone(), x0.ln()]
        );
    }

    #[test]
    fn test_children_of_repeated_subtree_are_not_extracted() {
        let (x, y) = symbols!(x, y);
        let log = (x.clone() + y.clone()).ln();
        let exprs = vec![log.clone() * Expr::Const(2.0), log.clone() + Expr::Const(1.0)];
        let result = Cse::new().optimize(&exprs);
        assert_eq!(result.definitions, vec![("x0".to_string(), log)]);
    }

    #[test]
    fn test_definitions_reference_only_earlier_names() {
        let (a, b, c) = symbols!(a, b, c);
        let sum = a.clone() + b.clone();
        let product = sum.clone() * c.clone();
        let exprs = vec![product.clone(), product.clone(), sum.clone()];
        let result = Cse::new().optimize(&exprs);
        let x0 = Expr::Var("x0".to_string());
        let x1 = Expr::Var("x1".to_string());
        assert_eq!(
            result.definitions,
            vec![
                ("x0".to_string(), sum),
                ("x1".to_string(), x0.clone() * c.clone()),
            ]
        );
        assert_eq!(result.expressions, vec![x1.clone(), x1, x0]);

        let mut known: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        for (name, definition) in &result.definitions {
            for var in definition.all_arguments_are_variables() {
                assert!(known.contains(&var), "{} used before definition", var);
            }
            known.insert(name.clone());
        }
    }

    #[test]
    fn test_names_skip_free_variables() {
        let (x0, y) = symbols!(x0, y);
        let sum = x0.clone() + y.clone();
        let result = Cse::new().optimize(&[sum.clone() * sum.clone()]);
        assert_eq!(result.definitions[0].0, "x1");

        let result = Cse::with_prefix("tmp").optimize(&[sum.clone() * sum]);
        assert_eq!(result.definitions[0].0, "tmp0");
    }

    #[test]
    fn test_negated_atoms_stay_inline() {
        let (x, y) = symbols!(x, y);
        let exprs = vec![-x.clone() + y.clone(), -x.clone() * y.clone()];
        let result = Cse::new().optimize(&exprs);
        assert!(result.definitions.is_empty());
        assert_eq!(result.expressions, exprs);
    }

    #[test]
    fn test_piecewise_branches_are_shared() {
        let (en, eg) = symbols!(en, eg);
        let diff = en.clone() - eg.clone();
        let pw = Expr::piecewise(vec![
            (diff.clone().ln(), en.greater_than(&eg)),
            (Expr::Const(0.0), Condition::Always),
        ]);
        let exprs = vec![pw.clone() * diff.clone(), pw.clone() + diff.clone()];
        let result = Cse::new().optimize(&exprs);
        assert_eq!(result.definitions.len(), 2);
        assert_eq!(result.definitions[0].1, diff);
        assert!(matches!(result.definitions[1].1, Expr::Piecewise(_)));
    }

    #[test]
    fn test_deterministic() {
        let (x, y) = symbols!(x, y);
        let sum = x.clone() + y.clone();
        let exprs = vec![sum.clone().pow(Expr::Const(2.0)) / sum.clone(), sum.atan() * x];
        let first = Cse::new().optimize(&exprs);
        let second = Cse::new().optimize(&exprs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluation_matches_original() {
        let (x, y, z) = symbols!(x, y, z);
        let inner = x.clone() * y.clone() + z.clone();
        let exprs = vec![
            inner.clone().ln() / inner.clone(),
            (inner.clone() * inner.clone()).sqrt() - inner.clone().ln(),
            Expr::piecewise(vec![
                (inner.clone().atan(), x.greater_than(&y)),
                (inner.clone(), Condition::Always),
            ]),
        ];
        let result = Cse::new().optimize(&exprs);
        assert!(!result.definitions.is_empty());
        assert!(result.node_count() < exprs.iter().map(|e| e.node_count()).sum::<usize>());

        let vars = ["x", "y", "z"];
        let mut rng = rand::rng();
        for _ in 0..5 {
            let values: Vec<f64> = (0..3).map(|_| rng.random_range(0.5..3.0)).collect();
            let optimized = result.evaluate(&vars, &values).unwrap();
            for (expr, value) in exprs.iter().zip(optimized) {
                let direct = expr.eval_expression(&vars, &values).unwrap();
                assert_relative_eq!(direct, value, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_evaluate_reports_unbound() {
        let (x, y) = symbols!(x, y);
        let result = Cse::new().optimize(&[x + y]);
        assert_eq!(
            result.evaluate(&["x"], &[1.0]),
            Err(EvalError::UnboundVariable("y".to_string()))
        );
        assert!(matches!(
            result.evaluate(&["x", "y"], &[1.0]),
            Err(EvalError::BindingMismatch { .. })
        ));
    }
}
