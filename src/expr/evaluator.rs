//! Walks an expression tree, producing a full-grid series per subexpression.

use super::ast::Expr;
use crate::compute::kernel;
use crate::compute::ledger::{require, SeriesSource};
use crate::error::{EngineError, Result};
use crate::graph::NodeId;
use crate::series::{Series, TimeGrid};

struct Context<'a> {
    owner: &'a NodeId,
    grid: &'a TimeGrid,
    inputs: &'a dyn SeriesSource,
}

pub fn evaluate(expr: &Expr, owner: &NodeId, grid: &TimeGrid, inputs: &dyn SeriesSource) -> Result<Series> {
    Context { owner, grid, inputs }.eval(expr)
}

impl Context<'_> {
    fn eval(&self, expr: &Expr) -> Result<Series> {
        match expr {
            Expr::Literal(v) => Ok(Series::constant(self.grid.bins(), *v)),
            Expr::NodeRef(id) => Ok(require(self.inputs, self.owner, id)?.clone()),
            Expr::Array(_) => Err(EngineError::InvalidArgument {
                function: "CONV".into(),
                message: "array literals are only valid as the kernel argument".into(),
            }),
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                self.same_len(&l, &r)?;
                Ok(Series::new(kernel::elementwise(*op, l.as_slice(), r.as_slice())))
            }
            Expr::Call { name, args } => self.call(name, args),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Series> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "SHIFT" => {
                arity(&upper, args, 2)?;
                let src = self.eval(&args[0])?;
                let lag = shift_lag(&args[1])?;
                Ok(kernel::shift(&src, lag))
            }
            "CONV" => {
                arity(&upper, args, 2)?;
                let src = self.eval(&args[0])?;
                let taps = match &args[1] {
                    Expr::Array(values) => values.clone(),
                    Expr::Literal(v) => vec![*v],
                    other => {
                        return Err(EngineError::InvalidArgument {
                            function: upper.clone(),
                            message: format!("kernel must be an array or number literal, got '{}'", other),
                        })
                    }
                };
                Ok(Series::new(kernel::convolve(self.grid.bins(), src.as_slice(), &taps)))
            }
            "MIN" | "MAX" => {
                arity(&upper, args, 2)?;
                let a = self.eval(&args[0])?;
                let b = self.eval(&args[1])?;
                self.same_len(&a, &b)?;
                let out = if upper == "MIN" {
                    kernel::zip_with(a.as_slice(), b.as_slice(), f64::min)
                } else {
                    kernel::zip_with(a.as_slice(), b.as_slice(), f64::max)
                };
                Ok(Series::new(out))
            }
            "CLAMP" => {
                arity(&upper, args, 3)?;
                let value = self.eval(&args[0])?;
                let lo = self.eval(&args[1])?;
                let hi = self.eval(&args[2])?;
                self.same_len(&value, &lo)?;
                self.same_len(&value, &hi)?;
                let out = (0..value.len())
                    .map(|t| lo[t].max(hi[t].min(value[t])))
                    .collect();
                Ok(Series::new(out))
            }
            _ => Err(EngineError::UnknownFunction { name: name.to_string() }),
        }
    }

    fn same_len(&self, a: &Series, b: &Series) -> Result<()> {
        if a.len() != b.len() {
            return Err(EngineError::LengthMismatch {
                node: self.owner.clone(),
                expected: a.len(),
                actual: b.len(),
            });
        }
        Ok(())
    }
}

fn arity(function: &str, args: &[Expr], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(EngineError::ArgumentCount {
            function: function.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

/// The lag must be a non-negative integer literal.
fn shift_lag(arg: &Expr) -> Result<usize> {
    match arg {
        Expr::Literal(v) if v.is_finite() && *v >= 0.0 && v.fract() == 0.0 => Ok(*v as usize),
        other => Err(EngineError::InvalidArgument {
            function: "SHIFT".into(),
            message: format!("lag must be a non-negative integer literal, got '{}'", other),
        }),
    }
}
