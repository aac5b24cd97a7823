//! Measurement units.
//!
//! Unit text on packs and readings is free-form, so normalization never
//! fails: anything unrecognized becomes volts. Conversion is best-effort:
//! unsupported pairs come back unchanged.

use serde::{Deserialize, Serialize};

/// Canonical measurement unit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    #[strum(serialize = "VDC")]
    Vdc,
    #[strum(serialize = "VAC")]
    Vac,
    #[default]
    #[strum(serialize = "V")]
    V,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "mA")]
    MilliAmp,
    #[strum(serialize = "Ohm")]
    Ohm,
    #[strum(serialize = "kOhm")]
    KiloOhm,
    #[strum(serialize = "psi")]
    Psi,
    #[strum(serialize = "bar")]
    Bar,
    #[strum(serialize = "Hz")]
    Hz,
    #[strum(serialize = "rpm")]
    Rpm,
}

/// psi -> bar
const PSI_TO_BAR: f64 = 0.0689476;

impl Unit {
    /// Volt-family units compare numerically equal for charting.
    pub fn is_voltage(&self) -> bool {
        matches!(self, Unit::Vdc | Unit::Vac | Unit::V)
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        normalize_unit(&raw)
    }
}

impl From<&str> for Unit {
    fn from(raw: &str) -> Self {
        normalize_unit(raw)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_ref().to_string()
    }
}

/// Map a free-text unit spelling to its canonical unit.
///
/// Matching ignores case, whitespace, dots and underscores. Unknown text
/// falls back to [`Unit::V`].
pub fn normalize_unit(raw: &str) -> Unit {
    let key: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '.' && *c != '_').collect();

    match key.to_lowercase().as_str() {
        "vdc" | "dcv" | "v(dc)" | "voltsdc" | "voltdc" => Unit::Vdc,
        "vac" | "acv" | "v(ac)" | "voltsac" | "voltac" => Unit::Vac,
        "v" | "volt" | "volts" | "voltage" => Unit::V,
        "a" | "amp" | "amps" | "ampere" | "amperes" => Unit::A,
        "ma" | "milliamp" | "milliamps" => Unit::MilliAmp,
        "ohm" | "ohms" | "ω" => Unit::Ohm,
        "kohm" | "kohms" | "kω" | "kiloohm" | "kiloohms" => Unit::KiloOhm,
        "psi" | "psig" | "lb/in2" => Unit::Psi,
        "bar" | "bars" => Unit::Bar,
        "hz" | "hertz" => Unit::Hz,
        "rpm" | "r/min" | "revs" => Unit::Rpm,
        _ => Unit::default(),
    }
}

/// Convert `value` between compatible units.
///
/// Unsupported pairs return `value` unchanged.
pub fn convert_unit(
    value: f64,
    from: Unit,
    to: Unit,
) -> f64 {
    match (from, to) {
        _ if from == to => value,
        (Unit::MilliAmp, Unit::A) => value / 1000.0,
        (Unit::A, Unit::MilliAmp) => value * 1000.0,
        (Unit::KiloOhm, Unit::Ohm) => value * 1000.0,
        (Unit::Ohm, Unit::KiloOhm) => value / 1000.0,
        (Unit::Psi, Unit::Bar) => value * PSI_TO_BAR,
        (Unit::Bar, Unit::Psi) => value / PSI_TO_BAR,
        _ if from.is_voltage() && to.is_voltage() => value,
        _ => value,
    }
}
