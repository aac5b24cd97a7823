use super::spec::{Comparison, ParsedSpec};

/// Float tolerance used for equality checks.
pub const EQ_EPSILON: f64 = 0.001;

/// Check a reading against a spec.
///
/// Range bounds are inclusive and an empty spec always passes. Callers must
/// reject non-finite readings before calling this.
pub fn evaluate(
    value: f64,
    spec: &ParsedSpec,
) -> bool {
    match *spec {
        ParsedSpec::Range { min, max } => min <= value && value <= max,
        ParsedSpec::Compare { cmp, exact } => compare(value, cmp, exact),
        ParsedSpec::Exact { exact } => (value - exact).abs() < EQ_EPSILON,
        ParsedSpec::Empty {} => true,
    }
}

fn compare(
    value: f64,
    cmp: Comparison,
    exact: f64,
) -> bool {
    match cmp {
        Comparison::Ge => value >= exact,
        Comparison::Le => value <= exact,
        Comparison::Gt => value > exact,
        Comparison::Lt => value < exact,
        Comparison::Eq => (value - exact).abs() < EQ_EPSILON,
    }
}
