use crate::core::rates::RateTable;
use crate::domain::model::{Frequency, Money, OrderDraft, ServiceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Business constants for the estimate. Unconfirmed by the business, so kept
/// overridable from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub weekly_multiplier: Decimal,
    pub biweekly_multiplier: Decimal,
    pub monthly_multiplier: Decimal,
    pub one_time_multiplier: Decimal,
    /// Square feet covered by the base price.
    pub size_unit: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            weekly_multiplier: Decimal::from(4),
            biweekly_multiplier: Decimal::from(2),
            monthly_multiplier: Decimal::ONE,
            one_time_multiplier: Decimal::new(15, 1),
            size_unit: 1000,
        }
    }
}

impl PricingConfig {
    pub fn multiplier(&self, frequency: Frequency) -> Decimal {
        match frequency {
            Frequency::Weekly => self.weekly_multiplier,
            Frequency::Biweekly => self.biweekly_multiplier,
            Frequency::Monthly => self.monthly_multiplier,
            Frequency::OneTime => self.one_time_multiplier,
        }
    }

    /// `max(1, property_size / size_unit)`
    pub fn size_factor(&self, property_size: u32) -> Decimal {
        if self.size_unit == 0 {
            return Decimal::ONE;
        }
        let factor = Decimal::from(property_size) / Decimal::from(self.size_unit);
        factor.max(Decimal::ONE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateLine {
    pub id: ServiceId,
    pub label: String,
    pub base_price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateBreakdown {
    pub lines: Vec<EstimateLine>,
    /// Selected ids with no rate; they add nothing to the total.
    pub unknown_services: Vec<ServiceId>,
    pub subtotal: Money,
    pub frequency_multiplier: Decimal,
    pub size_factor: Decimal,
    pub total: Money,
}

#[derive(Debug, Clone)]
pub struct PriceEstimator {
    rates: RateTable,
    pricing: PricingConfig,
}

impl PriceEstimator {
    pub fn new(rates: RateTable, pricing: PricingConfig) -> Self {
        Self { rates, pricing }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn estimate(&self, draft: &OrderDraft) -> Money {
        self.breakdown(draft).total
    }

    pub fn breakdown(&self, draft: &OrderDraft) -> EstimateBreakdown {
        let mut lines = Vec::with_capacity(draft.services.len());
        let mut unknown_services = Vec::new();

        for id in &draft.services {
            match self.rates.lookup(id) {
                Some(entry) => lines.push(EstimateLine {
                    id: entry.id.clone(),
                    label: entry.label.clone(),
                    base_price: entry.base_price,
                }),
                None => {
                    tracing::warn!("Service '{}' has no rate, counting it as 0", id);
                    unknown_services.push(id.clone());
                }
            }
        }

        let subtotal: Money = lines.iter().map(|line| line.base_price).sum();
        let frequency_multiplier = self.pricing.multiplier(draft.frequency);
        let size_factor = self.pricing.size_factor(draft.property_size);
        let total = (subtotal * frequency_multiplier * size_factor).round_to_unit();

        EstimateBreakdown {
            lines,
            unknown_services,
            subtotal,
            frequency_multiplier,
            size_factor,
            total,
        }
    }
}

impl Default for PriceEstimator {
    fn default() -> Self {
        Self::new(RateTable::default_rates(), PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with(services: &[&str], frequency: Frequency, property_size: u32) -> OrderDraft {
        let mut draft = OrderDraft {
            frequency,
            property_size,
            ..Default::default()
        };
        for id in services {
            draft.toggle_service(*id);
        }
        draft
    }

    #[test]
    fn test_weekly_two_services_double_size() {
        let estimator = PriceEstimator::default();
        let draft = draft_with(&["mowing", "fertilization"], Frequency::Weekly, 2000);
        assert_eq!(estimator.estimate(&draft), Money::from_dollars(960));
    }

    #[test]
    fn test_no_services_is_zero() {
        let estimator = PriceEstimator::default();
        let draft = draft_with(&[], Frequency::Biweekly, 500);
        assert_eq!(estimator.estimate(&draft), Money::ZERO);

        let large = draft_with(&[], Frequency::Weekly, 10_000);
        assert_eq!(estimator.estimate(&large), Money::ZERO);
    }

    #[test]
    fn test_small_property_uses_factor_of_one() {
        let estimator = PriceEstimator::default();
        let draft = draft_with(&["mowing"], Frequency::Monthly, 300);
        assert_eq!(estimator.estimate(&draft), Money::from_dollars(45));
    }

    #[test]
    fn test_one_time_rounds_to_whole_dollars() {
        let estimator = PriceEstimator::default();
        // 25 * 1.5 * 1.5 = 56.25
        let draft = draft_with(&["edging"], Frequency::OneTime, 1500);
        assert_eq!(estimator.estimate(&draft), Money::from_dollars(56));

        // 45 * 1.5 * 1 = 67.5
        let draft = draft_with(&["mowing"], Frequency::OneTime, 0);
        assert_eq!(estimator.estimate(&draft), Money::from_dollars(68));
    }

    #[test]
    fn test_unknown_services_contribute_zero() {
        let estimator = PriceEstimator::default();
        let draft = draft_with(&["mowing", "snow-plowing"], Frequency::Monthly, 1000);
        let breakdown = estimator.breakdown(&draft);

        assert_eq!(breakdown.total, Money::from_dollars(45));
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.unknown_services, vec![ServiceId::new("snow-plowing")]);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let estimator = PriceEstimator::default();
        let draft = draft_with(&["aeration", "mulching"], Frequency::Biweekly, 3333);
        assert_eq!(estimator.breakdown(&draft), estimator.breakdown(&draft));
    }

    #[test]
    fn test_monotonic_in_property_size() {
        let estimator = PriceEstimator::default();
        let mut previous = Money::ZERO;
        for size in (0..=10_000).step_by(250) {
            let draft = draft_with(&["mowing", "edging"], Frequency::OneTime, size);
            let current = estimator.estimate(&draft);
            assert!(current >= previous, "size {} decreased the estimate", size);
            previous = current;
        }
    }

    #[test]
    fn test_monotonic_in_selected_services() {
        let estimator = PriceEstimator::default();
        let mut draft = draft_with(&[], Frequency::Weekly, 1200);
        let mut previous = estimator.estimate(&draft);
        for entry in RateTable::default_entries() {
            draft.toggle_service(entry.id);
            let current = estimator.estimate(&draft);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_custom_multipliers() {
        let pricing = PricingConfig {
            weekly_multiplier: Decimal::from(3),
            size_unit: 500,
            ..Default::default()
        };
        let estimator = PriceEstimator::new(RateTable::default_rates(), pricing);
        let draft = draft_with(&["mowing"], Frequency::Weekly, 1000);
        // 45 * 3 * 2
        assert_eq!(estimator.estimate(&draft), Money::from_dollars(270));
    }
}
