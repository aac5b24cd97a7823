//! Expectation text parsing.
//!
//! Authors write expectations the way they appear in manuals: `24 VDC ±10%`,
//! `20–28`, `>=24`. [`parse_spec`] tries each accepted shape in a fixed order
//! and takes the first one that matches.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::unit::Unit;

/// Numeric literal, optionally signed.
const NUM: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)";
/// Unit token written next to a number.
const UNIT: &str = r"[A-Za-zΩω°µ]+";
/// Tolerance sign.
const PLUS_MINUS: &str = r"(?:±|\+/-|\+-)";

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"^({NUM})\s*(?:{UNIT})?\s*{PLUS_MINUS}\s*({NUM})\s*%$")));
static ABSOLUTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"^({NUM})\s*(?:{UNIT})?\s*{PLUS_MINUS}\s*({NUM})\s*(?:{UNIT})?$")));
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"^({NUM})\s*(?:{UNIT})?\s*(?:-|–|—|to)\s*({NUM})\s*(?:{UNIT})?$")));
static COMPARE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"^(>=|<=|==|≥|≤|>|<)\s*({NUM})\s*(?:{UNIT})?$")));
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"^({NUM})\s*(?:{UNIT})?$")));
static ANY_NUM_RE: LazyLock<Regex> = LazyLock::new(|| compile(NUM));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("spec patterns are valid regular expressions")
}

/// Comparison operator of a one-sided expectation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display, strum::EnumString)]
pub enum Comparison {
    #[serde(rename = ">=", alias = "gte", alias = "ge")]
    #[strum(to_string = ">=", serialize = "≥")]
    Ge,
    #[serde(rename = "<=", alias = "lte", alias = "le")]
    #[strum(to_string = "<=", serialize = "≤")]
    Le,
    #[serde(rename = "==", alias = "eq", alias = "=")]
    #[strum(serialize = "==")]
    Eq,
    #[serde(rename = ">", alias = "gt")]
    #[strum(serialize = ">")]
    Gt,
    #[serde(rename = "<", alias = "lt")]
    #[strum(serialize = "<")]
    Lt,
}

/// Normalized pass/fail criterion of a node.
///
/// [`ParsedSpec::Empty`] carries no criterion and always passes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum ParsedSpec {
    Range {
        min: f64,
        max: f64,
    },
    Compare {
        cmp: Comparison,
        exact: f64,
    },
    Exact {
        exact: f64,
    },
    Empty {},
}

impl ParsedSpec {
    /// Inclusive range with bounds in ascending order.
    pub fn range(
        a: f64,
        b: f64,
    ) -> Self {
        ParsedSpec::Range {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// `center ± center·percent/100`
    pub fn percent(
        center: f64,
        percent: f64,
    ) -> Self {
        let delta = center * percent / 100.0;
        Self::range(center - delta, center + delta)
    }

    /// `center ± tolerance`
    pub fn tolerance(
        center: f64,
        tolerance: f64,
    ) -> Self {
        Self::range(center - tolerance, center + tolerance)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ParsedSpec::Empty {})
    }
}

/// Parse an expectation string into a [`ParsedSpec`].
///
/// Never fails. Text without any number yields [`ParsedSpec::Empty`], which
/// the evaluator passes unconditionally.
pub fn parse_spec(
    expect: &str,
    unit: Unit,
) -> ParsedSpec {
    let text = expect.trim();
    let spec = parse_trimmed(text);

    if spec.is_empty() {
        warn!(expect = text, unit = %unit, "expectation has no number, it will always pass");
    } else {
        debug!(expect = text, unit = %unit, ?spec, "parsed expectation");
    }
    spec
}

fn parse_trimmed(text: &str) -> ParsedSpec {
    if let Some(caps) = PERCENT_RE.captures(text) {
        if let (Some(center), Some(percent)) = (number(&caps[1]), number(&caps[2])) {
            return ParsedSpec::percent(center, percent);
        }
    }

    if let Some(caps) = ABSOLUTE_RE.captures(text) {
        if let (Some(center), Some(tolerance)) = (number(&caps[1]), number(&caps[2])) {
            return ParsedSpec::tolerance(center, tolerance);
        }
    }

    if let Some(caps) = RANGE_RE.captures(text) {
        if let (Some(a), Some(b)) = (number(&caps[1]), number(&caps[2])) {
            return ParsedSpec::range(a, b);
        }
    }

    if let Some(caps) = COMPARE_RE.captures(text) {
        if let (Ok(cmp), Some(exact)) = (caps[1].parse::<Comparison>(), number(&caps[2])) {
            return ParsedSpec::Compare { cmp, exact };
        }
    }

    if let Some(caps) = BARE_RE.captures(text) {
        if let Some(exact) = number(&caps[1]) {
            return ParsedSpec::Exact { exact };
        }
    }

    ANY_NUM_RE
        .find_iter(text)
        .find_map(|m| number(m.as_str()))
        .map(|exact| ParsedSpec::Exact { exact })
        .unwrap_or(ParsedSpec::Empty {})
}

fn number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a spec for display.
///
/// Tolerance forms come back as plain ranges.
pub fn format_spec(
    spec: &ParsedSpec,
    unit: Unit,
) -> String {
    match spec {
        ParsedSpec::Range { min, max } => format!("{}-{} {}", format_number(*min), format_number(*max), unit),
        ParsedSpec::Compare { cmp, exact } => format!("{}{} {}", cmp, format_number(*exact), unit),
        ParsedSpec::Exact { exact } => format!("{} {}", format_number(*exact), unit),
        ParsedSpec::Empty {} => "any".to_string(),
    }
}

/// Round to three decimals and drop trailing zeros. Values too small to
/// survive rounding are printed in full.
pub(crate) fn format_number(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    match (rounded == 0.0, n == 0.0) {
        (true, true) => "0".to_string(),
        (true, false) => format!("{}", n),
        _ => format!("{}", rounded),
    }
}
