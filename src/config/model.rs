use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ConfigError;
use crate::core::totals::CalculationOptions;

/// Keys accepted by [`Config::set`], in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "locale",
    "currency",
    "color",
    "book_root",
    "backup_root",
    "enable_vat",
    "enable_cis",
    "default_labour_rate",
    "amount_tolerance",
    "vat_gross_up_factor",
    "expense_window_days",
    "expense_high_confidence_days",
    "expense_medium_confidence_days",
    "invoice_window_days",
    "invoice_high_confidence_days",
    "invoice_medium_confidence_days",
];

/// Stores business-level preferences shared by every document and book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub calculation: CalculationSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Where book files live. Relative to the data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_book_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-GB".into(),
            currency: "GBP".into(),
            calculation: CalculationSettings::default(),
            matching: MatchingSettings::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            default_book_root: None,
            default_backup_root: None,
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn calculation_options(&self) -> CalculationOptions {
        CalculationOptions::from(&self.calculation)
    }

    /// Book directory: the configured root, or `<data_dir>/books`.
    pub fn resolve_book_root(&self, data_dir: &Path) -> PathBuf {
        self.default_book_root
            .clone()
            .unwrap_or_else(|| data_dir.join("books"))
    }

    /// Backup directory: the configured root, or `<data_dir>/backups`.
    pub fn resolve_backup_root(&self, data_dir: &Path) -> PathBuf {
        self.default_backup_root
            .clone()
            .unwrap_or_else(|| data_dir.join("backups"))
    }

    /// Current value of every settable key, rendered for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let path = |root: &Option<PathBuf>| {
            root.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".into())
        };
        let m = &self.matching;
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("color", self.ui_color_enabled.to_string()),
            ("book_root", path(&self.default_book_root)),
            ("backup_root", path(&self.default_backup_root)),
            ("enable_vat", self.calculation.enable_vat.to_string()),
            ("enable_cis", self.calculation.enable_cis.to_string()),
            ("default_labour_rate", self.calculation.default_labour_rate.to_string()),
            ("amount_tolerance", m.amount_tolerance.to_string()),
            ("vat_gross_up_factor", m.vat_gross_up_factor.to_string()),
            ("expense_window_days", m.expense_window_days.to_string()),
            ("expense_high_confidence_days", m.expense_high_confidence_days.to_string()),
            ("expense_medium_confidence_days", m.expense_medium_confidence_days.to_string()),
            ("invoice_window_days", m.invoice_window_days.to_string()),
            ("invoice_high_confidence_days", m.invoice_high_confidence_days.to_string()),
            ("invoice_medium_confidence_days", m.invoice_medium_confidence_days.to_string()),
        ]
    }

    /// Parses `value` for `key` and stores it. Nothing changes on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, value)?.to_string(),
            "currency" => self.currency = non_empty(key, value)?.to_ascii_uppercase(),
            "color" => self.ui_color_enabled = parse_flag(key, value)?,
            "book_root" => self.default_book_root = parse_root(value),
            "backup_root" => self.default_backup_root = parse_root(value),
            "enable_vat" => self.calculation.enable_vat = parse_flag(key, value)?,
            "enable_cis" => self.calculation.enable_cis = parse_flag(key, value)?,
            "default_labour_rate" => {
                self.calculation.default_labour_rate = parse_non_negative(key, value)?
            }
            "amount_tolerance" => self.matching.amount_tolerance = parse_positive(key, value)?,
            "vat_gross_up_factor" => self.matching.vat_gross_up_factor = parse_positive(key, value)?,
            "expense_window_days" => self.matching.expense_window_days = parse_days(key, value)?,
            "expense_high_confidence_days" => {
                self.matching.expense_high_confidence_days = parse_days(key, value)?
            }
            "expense_medium_confidence_days" => {
                self.matching.expense_medium_confidence_days = parse_days(key, value)?
            }
            "invoice_window_days" => self.matching.invoice_window_days = parse_days(key, value)?,
            "invoice_high_confidence_days" => {
                self.matching.invoice_high_confidence_days = parse_days(key, value)?
            }
            "invoice_medium_confidence_days" => {
                self.matching.invoice_medium_confidence_days = parse_days(key, value)?
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn non_empty<'a>(key: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, value))
    } else {
        Ok(value)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// `default` (or an empty value) clears the override.
fn parse_root(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value.eq_ignore_ascii_case("default") {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_non_negative(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| invalid(key, value))
}

fn parse_positive(key: &str, value: &str) -> Result<f64, ConfigError> {
    parse_non_negative(key, value)
        .ok()
        .filter(|v| *v > 0.0)
        .ok_or_else(|| invalid(key, value))
}

fn parse_days(key: &str, value: &str) -> Result<i64, ConfigError> {
    value
        .parse::<i64>()
        .ok()
        .filter(|days| *days >= 0)
        .ok_or_else(|| invalid(key, value))
}

/// Business-level feature toggles for the totals engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationSettings {
    #[serde(default)]
    pub enable_vat: bool,
    #[serde(default)]
    pub enable_cis: bool,
    #[serde(default)]
    pub default_labour_rate: f64,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            enable_vat: true,
            enable_cis: false,
            default_labour_rate: 0.0,
        }
    }
}

/// Tolerances and windows used by the reconciliation matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingSettings {
    #[serde(default = "MatchingSettings::default_amount_tolerance")]
    pub amount_tolerance: f64,
    #[serde(default = "MatchingSettings::default_expense_window_days")]
    pub expense_window_days: i64,
    #[serde(default = "MatchingSettings::default_expense_high_days")]
    pub expense_high_confidence_days: i64,
    #[serde(default = "MatchingSettings::default_expense_medium_days")]
    pub expense_medium_confidence_days: i64,
    /// Fixed gross-up applied to expense amounts; the recorded VAT is not read.
    #[serde(default = "MatchingSettings::default_vat_gross_up_factor")]
    pub vat_gross_up_factor: f64,
    #[serde(default = "MatchingSettings::default_invoice_window_days")]
    pub invoice_window_days: i64,
    #[serde(default = "MatchingSettings::default_invoice_high_days")]
    pub invoice_high_confidence_days: i64,
    #[serde(default = "MatchingSettings::default_invoice_medium_days")]
    pub invoice_medium_confidence_days: i64,
}

impl MatchingSettings {
    fn default_amount_tolerance() -> f64 {
        0.01
    }

    fn default_expense_window_days() -> i64 {
        7
    }

    fn default_expense_high_days() -> i64 {
        2
    }

    fn default_expense_medium_days() -> i64 {
        5
    }

    fn default_vat_gross_up_factor() -> f64 {
        1.2
    }

    fn default_invoice_window_days() -> i64 {
        30
    }

    fn default_invoice_high_days() -> i64 {
        7
    }

    fn default_invoice_medium_days() -> i64 {
        14
    }
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            amount_tolerance: Self::default_amount_tolerance(),
            expense_window_days: Self::default_expense_window_days(),
            expense_high_confidence_days: Self::default_expense_high_days(),
            expense_medium_confidence_days: Self::default_expense_medium_days(),
            vat_gross_up_factor: Self::default_vat_gross_up_factor(),
            invoice_window_days: Self::default_invoice_window_days(),
            invoice_high_confidence_days: Self::default_invoice_high_days(),
            invoice_medium_confidence_days: Self::default_invoice_medium_days(),
        }
    }
}
