use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All monetary values, in the tenant's currency unit. Never f64.
pub type Money = Decimal;

/// Percentages as entered on the forms (30 = 30%), not as rates.
pub type Percent = Decimal;

/// Units produced in a run. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    /// Floors anything non-positive to one unit.
    pub fn new(raw: i64) -> Self {
        if raw < 1 {
            Quantity::ONE
        } else {
            Quantity(raw as u64)
        }
    }

    /// Absent quantities default to one unit, like the blank form field.
    pub fn from_optional(raw: Option<i64>) -> Self {
        raw.map(Quantity::new).unwrap_or(Quantity::ONE)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::ONE
    }
}

impl From<i64> for Quantity {
    fn from(raw: i64) -> Self {
        Quantity::new(raw)
    }
}

impl From<Quantity> for u64 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a calculation whose denominator must be positive.
///
/// Break-even figures are unreachable when the contribution margin is zero
/// or negative. That case is carried as `NotViable` instead of an infinite
/// number, so callers have to branch on it before doing arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viability<T> {
    Viable(T),
    NotViable,
}

impl<T> Viability<T> {
    pub fn is_viable(&self) -> bool {
        matches!(self, Viability::Viable(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            Viability::Viable(v) => Some(v),
            Viability::NotViable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Viability<U> {
        match self {
            Viability::Viable(v) => Viability::Viable(f(v)),
            Viability::NotViable => Viability::NotViable,
        }
    }

    /// Chain a step that may itself be unreachable, such as an overflowing product.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Viability<U> {
        match self.value().and_then(f) {
            Some(v) => Viability::Viable(v),
            None => Viability::NotViable,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }
}

/// Largest representable amount of the given sign.
pub fn saturated(negative: bool) -> Money {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// True when an amount sits at the edge of the representable range, i.e. a
/// saturating sum or product clipped it.
pub fn is_saturated(amount: Money) -> bool {
    amount == Decimal::MAX || amount == Decimal::MIN
}

/// part / whole * 100, zero when whole is zero. Saturates on overflow.
pub fn percent_of(part: Money, whole: Money) -> Percent {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| saturated(part.is_sign_negative() != whole.is_sign_negative()))
}

/// Display currency for a tenant. Only used when rendering amounts.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    AED,
    SAR,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
            Currency::SAR => "SAR",
            Currency::Other(code) => code,
        }
    }

    /// Display symbol. Codes without a known symbol fall back to the rupee sign.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::AED => "د.إ",
            Currency::SAR => "﷼",
            Currency::Other(_) => "₹",
        }
    }
}

impl FromStr for Currency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Currency::from(s.to_string()))
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        let code = code.trim().to_ascii_uppercase();
        match code.as_str() {
            "" | "INR" => Currency::INR,
            "USD" => Currency::USD,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            "AED" => Currency::AED,
            "SAR" => Currency::SAR,
            _ => Currency::Other(code),
        }
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
