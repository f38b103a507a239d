//! Record shapes handed to the persistence layer.
//!
//! Nothing here stores anything. These helpers build the rows a caller
//! persists and reject the ones the storage layer would refuse.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cost_sheet::{CostSheetInput, CostSheetOutput, LaborLine};
use crate::error::CostingError;
use crate::pricing::{PricingMethod, PricingOutput, ProfitTarget};
use crate::types::{Currency, Money, Percent, Quantity};
use crate::CostingResult;

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    #[default]
    Product,
    Service,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub kind: ProductKind,
    /// Unit of measure, e.g. "pcs", "kg", "hour"
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_monthly_quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    pub fn validate(&self) -> CostingResult<()> {
        require("name", &self.name)?;
        require("unit", &self.unit)
    }
}

fn require(field: &str, value: &str) -> CostingResult<()> {
    if value.trim().is_empty() {
        return Err(CostingError::InvalidInput {
            field: field.to_string(),
            reason: "is required".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cost sheets
// ---------------------------------------------------------------------------

/// Whether the stored quantity is a count of units or of batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostUnit {
    #[default]
    PerUnit,
    PerBatch,
}

/// Identifying fields of a cost sheet that the engine does not compute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetHeader {
    pub product_id: String,
    pub sheet_number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub cost_unit: CostUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A cost sheet as persisted.
///
/// `labor_rate` is the blended rate, labor cost over max(labor hours, 1), as
/// older readers expect it; `labor_lines` holds the exact per-line rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSheetRecord {
    pub product_id: String,
    pub sheet_number: String,
    pub date: NaiveDate,
    pub quantity_produced: Quantity,
    pub cost_unit: CostUnit,
    pub material_cost: Money,
    pub labor_cost: Money,
    pub labor_hours: Decimal,
    pub labor_rate: Money,
    #[serde(default)]
    pub labor_lines: Vec<LaborLine>,
    pub overhead_cost: Money,
    pub other_costs: Money,
    pub total_cost: Money,
    pub cost_per_unit: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CostSheetRecord {
    pub fn from_output(header: SheetHeader, input: &CostSheetInput, output: &CostSheetOutput) -> Self {
        CostSheetRecord {
            product_id: header.product_id,
            sheet_number: header.sheet_number,
            date: header.date,
            quantity_produced: output.quantity,
            cost_unit: header.cost_unit,
            material_cost: output.components.material_cost,
            labor_cost: output.components.labor_cost,
            labor_hours: output.total_labor_hours,
            labor_rate: output.blended_labor_rate,
            labor_lines: input.labor.clone(),
            overhead_cost: output.components.overhead_cost,
            other_costs: output.components.other_costs,
            total_cost: output.total_cost,
            cost_per_unit: output.cost_per_unit,
            notes: header.notes,
        }
    }

    pub fn validate(&self) -> CostingResult<()> {
        require("product_id", &self.product_id)?;
        require("sheet_number", &self.sheet_number)
    }
}

/// Sheet number for the next cost sheet: `CS-001`, `CS-002`, ...
///
/// Padding is three digits; numbers past 999 simply widen.
pub fn next_sheet_number(existing_count: u64) -> String {
    format!("CS-{:03}", existing_count.saturating_add(1))
}

// ---------------------------------------------------------------------------
// Pricing decisions
// ---------------------------------------------------------------------------

/// A chosen price, linked to the cost sheet it was derived from.
///
/// Exactly one of `markup_percentage`, `profit_margin` and `competitor_price`
/// is set, according to `pricing_method`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingDecisionRecord {
    pub cost_sheet_id: String,
    pub pricing_method: String,
    pub cost_per_unit: Money,
    pub selling_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_percentage: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PricingDecisionRecord {
    /// Absolute profit targets are stored as their equivalent margin.
    pub fn from_output(cost_sheet_id: impl Into<String>, output: &PricingOutput, notes: Option<String>) -> Self {
        let (markup_percentage, profit_margin, competitor_price) = match &output.method {
            PricingMethod::CostPlus { markup_pct } => (Some(*markup_pct), None, None),
            PricingMethod::DesiredProfit {
                target: ProfitTarget::MarginPct(m),
            } => (None, Some(*m), None),
            PricingMethod::DesiredProfit {
                target: ProfitTarget::ProfitAmount(_),
            } => (
                None,
                Some(output.equivalent_margin_pct.unwrap_or(output.pricing.margin_pct)),
                None,
            ),
            PricingMethod::MarketBasis { competitor_price } => (None, None, Some(*competitor_price)),
        };

        PricingDecisionRecord {
            cost_sheet_id: cost_sheet_id.into(),
            pricing_method: output.method.tag().to_string(),
            cost_per_unit: output.cost_per_unit,
            selling_price: output.pricing.selling_price,
            markup_percentage,
            profit_margin,
            competitor_price,
            notes,
        }
    }

    pub fn validate(&self) -> CostingResult<()> {
        require("cost_sheet_id", &self.cost_sheet_id)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub currency: Currency,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_sheet::{analyze_cost_sheet, MaterialsInput, OverheadBreakdown};
    use crate::pricing::{analyze_pricing, PricingInput};
    use rust_decimal_macros::dec;

    fn header() -> SheetHeader {
        SheetHeader {
            product_id: "prod-17".to_string(),
            sheet_number: next_sheet_number(4),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            cost_unit: CostUnit::PerBatch,
            notes: None,
        }
    }

    fn sheet_input() -> CostSheetInput {
        CostSheetInput {
            product_name: Some("Widget".to_string()),
            quantity_produced: Some(50),
            materials: MaterialsInput::Flat {
                material_cost: dec!(1000),
            },
            labor: vec![
                LaborLine {
                    description: "Assembly".to_string(),
                    hours: dec!(8),
                    rate: dec!(50),
                },
                LaborLine {
                    description: "QA".to_string(),
                    hours: dec!(2),
                    rate: dec!(100),
                },
            ],
            overhead: OverheadBreakdown {
                factory_overhead: dec!(300),
                utilities: dec!(0),
                depreciation: dec!(0),
            },
            other_costs: dec!(100),
        }
    }

    fn pricing_output(method: PricingMethod) -> PricingOutput {
        analyze_pricing(&PricingInput {
            cost_per_unit: dec!(50),
            method,
        })
        .result
    }

    #[test]
    fn test_product_requires_name_and_unit() {
        let mut p = Product {
            name: "Widget".to_string(),
            unit: "pcs".to_string(),
            ..Default::default()
        };
        assert!(p.validate().is_ok());

        p.unit = "  ".to_string();
        match p.validate() {
            Err(CostingError::InvalidInput { field, .. }) => assert_eq!(field, "unit"),
            other => panic!("expected invalid unit, got {other:?}"),
        }
    }

    #[test]
    fn test_sheet_numbering() {
        assert_eq!(next_sheet_number(0), "CS-001");
        assert_eq!(next_sheet_number(41), "CS-042");
        assert_eq!(next_sheet_number(999), "CS-1000");
    }

    #[test]
    fn test_cost_sheet_record_from_output() {
        let input = sheet_input();
        let out = analyze_cost_sheet(&input).result;
        let record = CostSheetRecord::from_output(header(), &input, &out);

        assert_eq!(record.sheet_number, "CS-005");
        // Labor = 8*50 + 2*100 = 600 over 10 hours
        assert_eq!(record.labor_cost, dec!(600));
        assert_eq!(record.labor_hours, dec!(10));
        assert_eq!(record.labor_rate, dec!(60));
        assert_eq!(record.labor_lines.len(), 2);
        // 1000 + 600 + 300 + 100 = 2000 / 50
        assert_eq!(record.total_cost, dec!(2000));
        assert_eq!(record.cost_per_unit, dec!(40));
        assert_eq!(record.quantity_produced.get(), 50);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_cost_sheet_record_requires_product() {
        let input = sheet_input();
        let out = analyze_cost_sheet(&input).result;
        let mut h = header();
        h.product_id = String::new();
        let record = CostSheetRecord::from_output(h, &input, &out);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_pricing_decision_stores_one_parameter() {
        let rec = PricingDecisionRecord::from_output(
            "cs-1",
            &pricing_output(PricingMethod::CostPlus { markup_pct: dec!(30) }),
            None,
        );
        assert_eq!(rec.pricing_method, "cost_plus");
        assert_eq!(rec.selling_price, dec!(65));
        assert_eq!(rec.markup_percentage, Some(dec!(30)));
        assert_eq!(rec.profit_margin, None);
        assert_eq!(rec.competitor_price, None);

        let rec = PricingDecisionRecord::from_output(
            "cs-1",
            &pricing_output(PricingMethod::MarketBasis {
                competitor_price: dec!(70),
            }),
            None,
        );
        assert_eq!(rec.competitor_price, Some(dec!(70)));
        assert_eq!(rec.markup_percentage, None);
    }

    #[test]
    fn test_profit_amount_stored_as_margin() {
        // 50 + 50 = 100, margin 50%
        let rec = PricingDecisionRecord::from_output(
            "cs-1",
            &pricing_output(PricingMethod::DesiredProfit {
                target: ProfitTarget::ProfitAmount(dec!(50)),
            }),
            Some("launch price".to_string()),
        );
        assert_eq!(rec.pricing_method, "desired_profit");
        assert_eq!(rec.profit_margin, Some(dec!(50)));
        assert_eq!(rec.selling_price, dec!(100));
    }

    #[test]
    fn test_pricing_decision_requires_cost_sheet() {
        let rec = PricingDecisionRecord::from_output(
            "",
            &pricing_output(PricingMethod::CostPlus { markup_pct: dec!(10) }),
            None,
        );
        assert!(rec.validate().is_err());
    }

    #[test]
    fn test_settings_default_currency() {
        let s: UserSettings = serde_json::from_str(r#"{"business_name": "Acme Castings"}"#).unwrap();
        assert_eq!(s.currency, Currency::INR);
        let s: UserSettings = serde_json::from_str(r#"{"currency": "usd"}"#).unwrap();
        assert_eq!(s.currency, Currency::USD);
    }
}
