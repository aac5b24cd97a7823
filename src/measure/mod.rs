//! Numeric expectations: units, spec parsing and pass/fail evaluation.

mod eval;
mod spec;
mod unit;

pub use eval::{EQ_EPSILON, evaluate};
pub use spec::{Comparison, ParsedSpec, format_spec, parse_spec};
pub(crate) use spec::format_number;
pub use unit::{Unit, convert_unit, normalize_unit};
