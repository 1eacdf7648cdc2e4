/// # C++ printer
/// turns a symbolic expression into one C++ expression
///
/// ```
/// use tauc_lorentz_gen::codegen::cxx_printer::cxx_code;
/// use tauc_lorentz_gen::symbolic::symbolic_engine::Expr;
/// let (x, y) = tauc_lorentz_gen::symbols!(x, y);
/// let code = cxx_code(&((x + y).sqrt() / Expr::Const(2.0))).unwrap();
/// assert_eq!(code, "std::sqrt(x + y)/2.0");
/// ```
pub mod cxx_printer;
/// `$name` / `${name}` template with the thirteen placeholders of the generated file
pub mod template;
/// the whole pipeline: model, derivatives, common subexpressions, printing, substitution
pub mod generator;
