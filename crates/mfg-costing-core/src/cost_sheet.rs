use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::types::{
    is_saturated, percent_of, with_metadata, ComputationOutput, Money, Percent, Quantity,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The four cost buckets every cost sheet reduces to.
///
/// Missing fields deserialize as zero, matching blank form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponents {
    #[serde(default)]
    pub material_cost: Money,
    #[serde(default)]
    pub labor_cost: Money,
    #[serde(default)]
    pub overhead_cost: Money,
    #[serde(default)]
    pub other_costs: Money,
}

impl CostComponents {
    /// Flat per-item figures, as entered directly.
    pub fn flat(material_cost: Money, labor_cost: Money, overhead_cost: Money, other_costs: Money) -> Self {
        CostComponents {
            material_cost,
            labor_cost,
            overhead_cost,
            other_costs,
        }
    }

    /// Material cost derived from stock movement. The result is not clamped:
    /// a negative material cost is a data-entry anomaly the user must see.
    pub fn from_stock_movement(
        materials: &MaterialConsumption,
        labor_cost: Money,
        overhead_cost: Money,
        other_costs: Money,
    ) -> Self {
        CostComponents {
            material_cost: materials.consumed(),
            labor_cost,
            overhead_cost,
            other_costs,
        }
    }

    /// Sum of all four buckets, clipped to the representable range.
    pub fn total(&self) -> Money {
        self.factory_cost().saturating_add(self.other_costs)
    }

    /// Sum of all four buckets, `None` when it does not fit in a Decimal.
    pub fn checked_total(&self) -> Option<Money> {
        self.material_cost
            .checked_add(self.labor_cost)?
            .checked_add(self.overhead_cost)?
            .checked_add(self.other_costs)
    }

    /// Direct materials + direct labor
    pub fn prime_cost(&self) -> Money {
        self.material_cost.saturating_add(self.labor_cost)
    }

    /// Prime cost + manufacturing overhead
    pub fn factory_cost(&self) -> Money {
        self.prime_cost().saturating_add(self.overhead_cost)
    }
}

/// Materials consumed over a run, from the stock ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialConsumption {
    #[serde(default)]
    pub opening_stock: Money,
    #[serde(default)]
    pub purchases: Money,
    #[serde(default)]
    pub carriage_inward: Money,
    #[serde(default)]
    pub closing_stock: Money,
    #[serde(default)]
    pub scrap: Money,
}

impl MaterialConsumption {
    /// opening + purchases + carriage inward - closing - scrap
    pub fn consumed(&self) -> Money {
        self.opening_stock
            .saturating_add(self.purchases)
            .saturating_add(self.carriage_inward)
            .saturating_sub(self.closing_stock)
            .saturating_sub(self.scrap)
    }
}

/// How the materials figure of a cost sheet was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum MaterialsInput {
    Flat {
        #[serde(default)]
        material_cost: Money,
    },
    StockMovement(MaterialConsumption),
}

impl Default for MaterialsInput {
    fn default() -> Self {
        MaterialsInput::Flat {
            material_cost: Decimal::ZERO,
        }
    }
}

impl MaterialsInput {
    pub fn material_cost(&self) -> Money {
        match self {
            MaterialsInput::Flat { material_cost } => *material_cost,
            MaterialsInput::StockMovement(m) => m.consumed(),
        }
    }
}

/// A single direct labor line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborLine {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: Decimal,
    /// Rate per hour
    #[serde(default)]
    pub rate: Money,
}

impl LaborLine {
    pub fn amount(&self) -> Money {
        self.hours.saturating_mul(self.rate)
    }
}

/// Manufacturing overhead, itemized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverheadBreakdown {
    #[serde(default)]
    pub factory_overhead: Money,
    #[serde(default)]
    pub utilities: Money,
    #[serde(default)]
    pub depreciation: Money,
}

impl OverheadBreakdown {
    pub fn total(&self) -> Money {
        self.factory_overhead
            .saturating_add(self.utilities)
            .saturating_add(self.depreciation)
    }
}

/// Input for an itemized cost sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSheetInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Units produced in the run; absent or non-positive counts as one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_produced: Option<i64>,
    #[serde(default)]
    pub materials: MaterialsInput,
    #[serde(default)]
    pub labor: Vec<LaborLine>,
    #[serde(default)]
    pub overhead: OverheadBreakdown,
    #[serde(default)]
    pub other_costs: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Total and per-unit cost of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSheetResult {
    pub total_cost: Money,
    pub cost_per_unit: Money,
}

/// Share of total cost per bucket, in percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material_pct: Percent,
    pub labor_pct: Percent,
    pub overhead_pct: Percent,
    pub other_pct: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSheetOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: Quantity,
    pub components: CostComponents,
    pub prime_cost: Money,
    pub factory_cost: Money,
    pub total_cost: Money,
    pub cost_per_unit: Money,
    pub total_labor_hours: Decimal,
    /// Labor cost over max(labor hours, 1); lossy when lines carry different rates
    pub blended_labor_rate: Money,
    pub breakdown: CostBreakdown,
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// totalCost = sum of components, costPerUnit = totalCost / quantity.
pub fn aggregate(components: &CostComponents, quantity: Quantity) -> CostSheetResult {
    let total_cost = components.total();
    CostSheetResult {
        total_cost,
        cost_per_unit: total_cost / quantity.as_decimal(),
    }
}

pub fn total_labor_cost(lines: &[LaborLine]) -> Money {
    lines
        .iter()
        .map(LaborLine::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn total_labor_hours(lines: &[LaborLine]) -> Decimal {
    lines
        .iter()
        .map(|l| l.hours)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Average hourly rate across all labor lines, as stored on saved sheets.
///
/// Hours below one are divided as one hour, so a half-hour job at 100/h
/// stores a rate of 50. Zero when no labor is booked.
pub fn blended_labor_rate(lines: &[LaborLine]) -> Money {
    let hours = total_labor_hours(lines).max(Decimal::ONE);
    total_labor_cost(lines) / hours
}

/// Share of each bucket in the total, zero everywhere when total <= 0.
pub fn breakdown(components: &CostComponents) -> CostBreakdown {
    let total = components.total();
    let pct = |part: Money| {
        if total <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            percent_of(part, total)
        }
    };
    CostBreakdown {
        material_pct: pct(components.material_cost),
        labor_pct: pct(components.labor_cost),
        overhead_pct: pct(components.overhead_cost),
        other_pct: pct(components.other_costs),
    }
}

/// Reduce an itemized input to its four cost buckets.
pub fn components_of(input: &CostSheetInput) -> CostComponents {
    let labor = total_labor_cost(&input.labor);
    let overhead = input.overhead.total();
    match &input.materials {
        MaterialsInput::Flat { material_cost } => {
            CostComponents::flat(*material_cost, labor, overhead, input.other_costs)
        }
        MaterialsInput::StockMovement(m) => {
            CostComponents::from_stock_movement(m, labor, overhead, input.other_costs)
        }
    }
}

// ---------------------------------------------------------------------------
// Function: analyze_cost_sheet
// ---------------------------------------------------------------------------

/// Build a full cost sheet: components, prime and factory cost, totals,
/// per-unit cost, labor statistics and cost breakdown.
///
/// Never fails. Degenerate input produces warnings, not errors.
pub fn analyze_cost_sheet(input: &CostSheetInput) -> ComputationOutput<CostSheetOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let quantity = Quantity::from_optional(input.quantity_produced);
    if let Some(raw) = input.quantity_produced {
        if raw < 1 {
            warn!(quantity = raw, "non-positive quantity produced; using 1");
            warnings.push(format!(
                "Quantity produced {} is not positive; cost per unit uses a quantity of 1",
                raw
            ));
        }
    }

    for line in &input.labor {
        if line.hours < Decimal::ZERO || line.rate < Decimal::ZERO {
            warnings.push(format!(
                "Labor line '{}' has negative hours or rate",
                line.description
            ));
        }
    }

    let components = components_of(input);
    if components.material_cost < Decimal::ZERO {
        warn!(material_cost = %components.material_cost, "material consumption is negative");
        warnings.push(format!(
            "Material consumption is negative ({}); closing stock and scrap exceed stock available",
            components.material_cost
        ));
    }

    let bucket_clipped = [
        components.material_cost,
        components.labor_cost,
        components.overhead_cost,
        components.other_costs,
    ]
    .into_iter()
    .any(is_saturated);
    if bucket_clipped || components.checked_total().is_none() {
        warn!(total_cost = %components.total(), "cost sheet amounts overflow; totals clipped");
        warnings.push(
            "Cost amounts exceed the largest representable value; totals are clipped to that limit"
                .to_string(),
        );
    }

    let CostSheetResult {
        total_cost,
        cost_per_unit,
    } = aggregate(&components, quantity);

    debug!(
        total_cost = %total_cost,
        cost_per_unit = %cost_per_unit,
        quantity = quantity.get(),
        "cost sheet aggregated"
    );

    let output = CostSheetOutput {
        product_name: input.product_name.clone(),
        quantity,
        prime_cost: components.prime_cost(),
        factory_cost: components.factory_cost(),
        total_cost,
        cost_per_unit,
        total_labor_hours: total_labor_hours(&input.labor),
        blended_labor_rate: blended_labor_rate(&input.labor),
        breakdown: breakdown(&components),
        components,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    let materials_basis = match input.materials {
        MaterialsInput::Flat { .. } => "flat",
        MaterialsInput::StockMovement(_) => "stock_movement",
    };

    with_metadata(
        "Cost Sheet: Prime Cost + Overhead + Other Costs, per Unit Produced",
        &serde_json::json!({
            "product": input.product_name,
            "quantity_produced": quantity.get(),
            "materials_basis": materials_basis,
            "labor_lines": input.labor.len(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
