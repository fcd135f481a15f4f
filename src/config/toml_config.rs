use crate::core::estimator::{PriceEstimator, PricingConfig};
use crate::core::rates::{RateEntry, RateTable};
use crate::core::SubmissionSettings;
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/contact";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const MAX_MULTIPLIER: u32 = 100;
pub const MAX_SIZE_UNIT: u32 = 100_000;

/// Wizard configuration file. Every section is optional and falls back to
/// the built-in rates and pricing constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub pricing: PricingConfig,
    pub submission: SubmissionConfig,
    pub rates: Option<Vec<RateEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl SubmissionSettings for SubmissionConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl WizardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| OrderError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${ORDER_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| OrderError::config(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn rate_table(&self) -> Result<RateTable> {
        match &self.rates {
            Some(entries) => RateTable::from_entries(entries.clone()),
            None => Ok(RateTable::default_rates()),
        }
    }

    pub fn estimator(&self) -> Result<PriceEstimator> {
        Ok(PriceEstimator::new(self.rate_table()?, self.pricing.clone()))
    }

    fn validate_pricing(&self) -> Result<()> {
        let pricing = &self.pricing;
        let multipliers = [
            ("pricing.weekly_multiplier", pricing.weekly_multiplier),
            ("pricing.biweekly_multiplier", pricing.biweekly_multiplier),
            ("pricing.monthly_multiplier", pricing.monthly_multiplier),
            ("pricing.one_time_multiplier", pricing.one_time_multiplier),
        ];
        for (field, value) in multipliers {
            validate_range(field, value, Decimal::ZERO, Decimal::from(MAX_MULTIPLIER))?;
        }
        validate_range("pricing.size_unit", pricing.size_unit, 1, MAX_SIZE_UNIT)
    }
}

impl Validate for WizardConfig {
    fn validate(&self) -> Result<()> {
        validate_url("submission.endpoint", &self.submission.endpoint)?;
        validate_positive_number(
            "submission.timeout_seconds",
            self.submission.timeout_seconds,
            1,
        )?;
        self.validate_pricing()?;

        if let Some(entries) = &self.rates {
            if entries.is_empty() {
                return Err(OrderError::config("rates must list at least one service"));
            }
        }
        self.rate_table().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Money, ServiceId};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = WizardConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.submission.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.rate_table().unwrap().len(), 10);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pricing]
weekly_multiplier = 3.5
size_unit = 500

[submission]
endpoint = "https://orders.example.com/api/contact"
timeout_seconds = 3

[[rates]]
id = "mowing"
label = "Mowing"
base_price = 40

[[rates]]
id = "edging"
label = "Edging"
base_price = "22.50"
"#;

        let config = WizardConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing.weekly_multiplier, Decimal::new(35, 1));
        assert_eq!(config.pricing.monthly_multiplier, Decimal::ONE);
        assert_eq!(config.pricing.size_unit, 500);
        assert_eq!(config.submission.timeout_seconds, 3);

        let rates = config.rate_table().unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(
            rates.lookup(&ServiceId::new("edging")).unwrap().base_price,
            Money::new(Decimal::new(2250, 2))
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_ORDER_ENDPOINT", "https://orders.test.com/submit");

        let toml_content = r#"
[submission]
endpoint = "${TEST_ORDER_ENDPOINT}"
"#;

        let config = WizardConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.submission.endpoint, "https://orders.test.com/submit");

        std::env::remove_var("TEST_ORDER_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = WizardConfig::from_toml_str(
            r#"
[submission]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_unit = WizardConfig::from_toml_str(
            r#"
[pricing]
size_unit = 0
"#,
        )
        .unwrap();
        assert!(bad_unit.validate().is_err());

        let negative_multiplier = WizardConfig::from_toml_str(
            r#"
[pricing]
monthly_multiplier = -1
"#,
        )
        .unwrap();
        match negative_multiplier.validate().unwrap_err() {
            OrderError::InvalidConfigValueError { field, reason, .. } => {
                assert_eq!(field, "pricing.monthly_multiplier");
                assert!(reason.contains("between 0 and 100"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let blank_label = WizardConfig::from_toml_str(
            r#"
[[rates]]
id = "mowing"
label = ""
base_price = 40
"#,
        )
        .unwrap();
        assert!(blank_label.validate().is_err());

        let duplicate_rates = WizardConfig::from_toml_str(
            r#"
[[rates]]
id = "mowing"
label = "Mowing"
base_price = 40

[[rates]]
id = "mowing"
label = "Mowing"
base_price = 45
"#,
        )
        .unwrap();
        assert!(duplicate_rates.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[submission]
endpoint = "https://orders.example.com"
timeout_seconds = 5
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = WizardConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.submission.endpoint, "https://orders.example.com");
        assert_eq!(config.submission.timeout_seconds, 5);
    }
}
