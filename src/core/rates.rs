use crate::domain::model::{Money, ServiceId};
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: ServiceId,
    pub label: String,
    pub base_price: Money,
}

impl RateEntry {
    pub fn new(id: &str, label: &str, base_price: i64) -> Self {
        Self {
            id: ServiceId::new(id),
            label: label.to_string(),
            base_price: Money::from_dollars(base_price),
        }
    }
}

/// Read-only mapping from service id to its base price, fixed at load time.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: Vec<RateEntry>,
    index: HashMap<ServiceId, usize>,
}

impl RateTable {
    /// 建立費率表，並檢查 id 唯一、價格非負
    pub fn from_entries(entries: Vec<RateEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            validate_non_empty_string(&format!("rates[{}].id", position), entry.id.as_str())?;
            validate_non_empty_string(&format!("rates[{}].label", position), &entry.label)?;
            if entry.base_price.is_negative() {
                return Err(OrderError::InvalidConfigValueError {
                    field: format!("rates[{}].base_price", position),
                    value: entry.base_price.to_string(),
                    reason: "Base price cannot be negative".to_string(),
                });
            }
            if index.insert(entry.id.clone(), position).is_some() {
                return Err(OrderError::InvalidConfigValueError {
                    field: format!("rates[{}].id", position),
                    value: entry.id.to_string(),
                    reason: "Duplicate service id".to_string(),
                });
            }
        }

        tracing::debug!("Loaded rate table with {} services", entries.len());
        Ok(Self { entries, index })
    }

    pub fn default_entries() -> Vec<RateEntry> {
        vec![
            RateEntry::new("mowing", "Lawn Mowing", 45),
            RateEntry::new("edging", "Edging & Trimming", 25),
            RateEntry::new("fertilization", "Fertilization", 75),
            RateEntry::new("weed-control", "Weed Control", 60),
            RateEntry::new("leaf-removal", "Leaf Removal", 55),
            RateEntry::new("hedge-trimming", "Hedge Trimming", 65),
            RateEntry::new("aeration", "Core Aeration", 90),
            RateEntry::new("mulching", "Mulching", 80),
            RateEntry::new("irrigation-check", "Irrigation Check", 50),
            RateEntry::new("pest-control", "Pest Control", 70),
        ]
    }

    pub fn default_rates() -> Self {
        let entries = Self::default_entries();
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.id.clone(), position))
            .collect();
        Self { entries, index }
    }

    pub fn lookup(&self, id: &ServiceId) -> Option<&RateEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::default_rates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let rates = RateTable::default_rates();
        let mowing = rates.lookup(&ServiceId::new("mowing")).unwrap();
        assert_eq!(mowing.base_price, Money::from_dollars(45));
        assert_eq!(mowing.label, "Lawn Mowing");
        assert!(rates.lookup(&ServiceId::new("snow-plowing")).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let entries = vec![
            RateEntry::new("mowing", "Mowing", 45),
            RateEntry::new("mowing", "Mowing again", 50),
        ];
        let err = RateTable::from_entries(entries).unwrap_err();
        assert!(err.to_string().contains("Duplicate service id"));
    }

    #[test]
    fn test_blank_id_or_label_rejected() {
        let blank_label = vec![
            RateEntry::new("mowing", "Mowing", 45),
            RateEntry::new("edging", "  ", 25),
        ];
        match RateTable::from_entries(blank_label).unwrap_err() {
            OrderError::InvalidConfigValueError { field, .. } => assert_eq!(field, "rates[1].label"),
            other => panic!("unexpected error: {other:?}"),
        }

        let blank_id = vec![RateEntry::new("", "Mowing", 45)];
        match RateTable::from_entries(blank_id).unwrap_err() {
            OrderError::InvalidConfigValueError { field, .. } => assert_eq!(field, "rates[0].id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let entries = vec![RateEntry::new("mowing", "Mowing", -1)];
        assert!(RateTable::from_entries(entries).is_err());
    }

    #[test]
    fn test_iteration_keeps_load_order() {
        let rates = RateTable::from_entries(vec![
            RateEntry::new("b", "B", 1),
            RateEntry::new("a", "A", 2),
        ])
        .unwrap();
        let ids: Vec<&str> = rates.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(rates.len(), 2);
    }
}
