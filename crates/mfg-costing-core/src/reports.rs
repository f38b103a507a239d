use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::cost_sheet::CostComponents;
use crate::types::{with_metadata, ComputationOutput, Money};

/// Group name for sheets whose product is unknown.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// The figures of one saved cost sheet that reporting needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSheetSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(flatten)]
    pub components: CostComponents,
    #[serde(default)]
    pub total_cost: Money,
    #[serde(default)]
    pub cost_per_unit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRollup {
    pub product_name: String,
    pub sheet_count: usize,
    pub total_cost: Money,
    pub average_cost_per_unit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub sheet_count: usize,
    /// Sum of stored sheet totals
    pub total_cost_value: Money,
    pub average_cost_per_unit: Money,
    /// Sum of each bucket across sheets
    pub component_totals: CostComponents,
    /// Materials + labor + overhead across sheets, excluding other costs
    pub grand_total: Money,
    /// One entry per product, in order of first appearance
    pub by_product: Vec<ProductRollup>,
}

fn average(sum: Money, count: usize) -> Money {
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}

/// Clipped to the representable range instead of overflowing.
fn sum(amounts: impl Iterator<Item = Money>) -> Money {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Totals, averages and per-product rollups across saved cost sheets.
pub fn summarize_cost_sheets(sheets: &[CostSheetSummary]) -> ComputationOutput<CostReport> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let total_cost_value = sum(sheets.iter().map(|s| s.total_cost));
    let unit_cost_sum = sum(sheets.iter().map(|s| s.cost_per_unit));

    let component_totals = sheets.iter().fold(CostComponents::default(), |acc, s| {
        CostComponents {
            material_cost: acc.material_cost.saturating_add(s.components.material_cost),
            labor_cost: acc.labor_cost.saturating_add(s.components.labor_cost),
            overhead_cost: acc.overhead_cost.saturating_add(s.components.overhead_cost),
            other_costs: acc.other_costs.saturating_add(s.components.other_costs),
        }
    });
    let grand_total = component_totals.factory_cost();

    // Insertion-ordered grouping; product counts are small
    let mut groups: Vec<(String, Vec<&CostSheetSummary>)> = Vec::new();
    for sheet in sheets {
        let name = sheet
            .product_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNKNOWN_PRODUCT);
        match groups.iter_mut().find(|(g, _)| g == name) {
            Some((_, members)) => members.push(sheet),
            None => groups.push((name.to_string(), vec![sheet])),
        }
    }

    let by_product = groups
        .into_iter()
        .map(|(product_name, members)| {
            let total_cost = sum(members.iter().map(|s| s.total_cost));
            let unit_sum = sum(members.iter().map(|s| s.cost_per_unit));
            ProductRollup {
                product_name,
                sheet_count: members.len(),
                total_cost,
                average_cost_per_unit: average(unit_sum, members.len()),
            }
        })
        .collect::<Vec<_>>();

    for s in sheets {
        if s.components.total() != s.total_cost {
            warnings.push(format!(
                "Sheet {}: components sum to {} but stored total is {}",
                s.sheet_number.as_deref().unwrap_or("(unnumbered)"),
                s.components.total(),
                s.total_cost
            ));
        }
    }

    let report = CostReport {
        sheet_count: sheets.len(),
        total_cost_value,
        average_cost_per_unit: average(unit_cost_sum, sheets.len()),
        component_totals,
        grand_total,
        by_product,
    };

    debug!(
        sheets = report.sheet_count,
        products = report.by_product.len(),
        "cost sheets summarized"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Cost Sheet Portfolio Summary",
        &serde_json::json!({
            "sheets": sheets.len(),
        }),
        warnings,
        elapsed,
        report,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sheet(num: &str, product: Option<&str>, m: Decimal, l: Decimal, o: Decimal, x: Decimal, qty: Decimal) -> CostSheetSummary {
        let components = CostComponents::flat(m, l, o, x);
        let total = components.total();
        CostSheetSummary {
            sheet_number: Some(num.to_string()),
            product_name: product.map(str::to_string),
            components,
            total_cost: total,
            cost_per_unit: total / qty,
        }
    }

    fn sample() -> Vec<CostSheetSummary> {
        vec![
            sheet("CS-001", Some("Bracket"), dec!(500), dec!(300), dec!(150), dec!(50), dec!(10)),
            sheet("CS-002", Some("Hinge"), dec!(200), dec!(100), dec!(80), dec!(20), dec!(20)),
            sheet("CS-003", Some("Bracket"), dec!(600), dec!(300), dec!(50), dec!(50), dec!(5)),
            sheet("CS-004", None, dec!(100), dec!(0), dec!(0), dec!(0), dec!(1)),
        ]
    }

    #[test]
    fn test_totals_and_average() {
        let out = summarize_cost_sheets(&sample());
        let r = &out.result;
        // Totals: 1000 + 400 + 1000 + 100 = 2500
        assert_eq!(r.sheet_count, 4);
        assert_eq!(r.total_cost_value, dec!(2500));
        // Per unit: 100 + 20 + 200 + 100 = 420 / 4 = 105
        assert_eq!(r.average_cost_per_unit, dec!(105));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_component_totals_and_grand_total() {
        let r = summarize_cost_sheets(&sample()).result;
        assert_eq!(
            r.component_totals,
            CostComponents::flat(dec!(1400), dec!(700), dec!(280), dec!(120))
        );
        // Grand total leaves other costs out
        assert_eq!(r.grand_total, dec!(2380));
    }

    #[test]
    fn test_grouped_by_product_in_first_seen_order() {
        let r = summarize_cost_sheets(&sample()).result;
        let names: Vec<&str> = r.by_product.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Bracket", "Hinge", UNKNOWN_PRODUCT]);

        let bracket = &r.by_product[0];
        assert_eq!(bracket.sheet_count, 2);
        assert_eq!(bracket.total_cost, dec!(2000));
        // (100 + 200) / 2
        assert_eq!(bracket.average_cost_per_unit, dec!(150));
    }

    #[test]
    fn test_empty_report_is_zero() {
        let r = summarize_cost_sheets(&[]).result;
        assert_eq!(r.sheet_count, 0);
        assert_eq!(r.total_cost_value, dec!(0));
        assert_eq!(r.average_cost_per_unit, dec!(0));
        assert!(r.by_product.is_empty());
    }

    #[test]
    fn test_inconsistent_stored_total_warns() {
        let mut sheets = sample();
        sheets[1].total_cost = dec!(999);
        let out = summarize_cost_sheets(&sheets);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("CS-002"));
    }
}
