use crate::symbolic::symbolic_engine::{EvalError, Expr};
use log::debug;
use nalgebra::DMatrix;
///
/// calculate symbolic jacobian and evaluate it
/// Example#
/// ```
/// use tauc_lorentz_gen::symbolic::symbolic_engine::Expr;
/// use tauc_lorentz_gen::symbolic::symbolic_functions::Jacobian;
///     let mut Jacobian_instance = Jacobian::new();
///     let x = Expr::Var("x".to_string());
///     let y = Expr::Var("y".to_string());
///     // set vector of functions
///     Jacobian_instance.set_vector_of_functions(vec![x.clone() * y.clone(), x + y]);
///     // set vector of variables
///     Jacobian_instance.set_variables(vec!["x", "y"]);
///     // calculate symbolic jacobian, every entry simplified
///     Jacobian_instance.calc_jacobian();
///     // transform into human...kind of readable form
///     Jacobian_instance.readable_jacobian();
///     // evaluate jacobian to nalgebra matrix format
///     let evaluated = Jacobian_instance.evaluate_DMatrix(&[10.0, 2.0]).unwrap();
///     assert_eq!(evaluated[(0, 0)], 2.0);
///     assert_eq!(evaluated[(0, 1)], 10.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Jacobian {
    pub vector_of_functions: Vec<Expr>,    // vector of symbolic functions/expressions
    pub vector_of_variables: Vec<Expr>,    // vector of symbolic variables
    pub variable_string: Vec<String>,      // vector of string representation of variables
    pub symbolic_jacobian: Vec<Vec<Expr>>, // vector of symbolic jacobian
    pub readable_jacobian: Vec<Vec<String>>, // human readable jacobian
}

impl Jacobian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vectors(vector_of_functions: Vec<Expr>, variables: Vec<&str>) -> Self {
        let mut jacobian = Self::new();
        jacobian.set_vector_of_functions(vector_of_functions);
        jacobian.set_variables(variables);
        jacobian
    }
    /// Basic functionality: setting variables and functions
    pub fn set_vector_of_functions(&mut self, value: Vec<Expr>) {
        self.vector_of_functions = value;
    }
    pub fn set_variables(&mut self, varvec: Vec<&str>) {
        let vec_trimmed: Vec<String> = varvec.iter().map(|s| s.trim().to_string()).collect();
        let symbols = vec_trimmed.join(",");
        self.variable_string = vec_trimmed;
        self.vector_of_variables = Expr::Symbols(&symbols);
    }
    /// turn jacobian into readable format
    pub fn readable_jacobian(&mut self) {
        self.readable_jacobian = self
            .symbolic_jacobian
            .iter()
            .map(|row| row.iter().map(|element| element.to_string()).collect())
            .collect();
    }
    /// calculate the symbolic jacobian: row i holds the partial derivatives of function i,
    /// column j is variable j; every entry goes through the full simplifier
    pub fn calc_jacobian(&mut self) {
        let new_jac: Vec<Vec<Expr>> = self
            .vector_of_functions
            .iter()
            .map(|func| {
                self.variable_string
                    .iter()
                    .map(|var| func.diff(var).simplify())
                    .collect()
            })
            .collect();
        debug!(
            "jacobian {}x{}: {} nodes",
            new_jac.len(),
            self.variable_string.len(),
            new_jac.iter().flatten().map(|e| e.node_count()).sum::<usize>()
        );
        self.symbolic_jacobian = new_jac;
    }
    /// entries in row-major order: (0,0), (0,1), ..., (n-1,m-1)
    pub fn flat_row_major(&self) -> Vec<Expr> {
        self.symbolic_jacobian.iter().flatten().cloned().collect()
    }
    /// calculate the element of the jacobian - test function for correctness
    pub fn calc_ij_element(&self, i: usize, j: usize, values: &[f64]) -> Result<f64, EvalError> {
        let vars: Vec<&str> = self.variable_string.iter().map(|s| s.as_str()).collect();
        self.symbolic_jacobian[i][j].eval_expression(&vars, values)
    }
    /// evaluate jacobian to nalgebra matrix format, values ordered as the variables
    pub fn evaluate_DMatrix(&self, values: &[f64]) -> Result<DMatrix<f64>, EvalError> {
        let n_rows = self.symbolic_jacobian.len();
        let n_cols = self.variable_string.len();
        let mut matrix = DMatrix::zeros(n_rows, n_cols);
        for i in 0..n_rows {
            for j in 0..n_cols {
                matrix[(i, j)] = self.calc_ij_element(i, j, values)?;
            }
        }
        Ok(matrix)
    }
}
