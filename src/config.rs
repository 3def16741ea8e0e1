//! Country rate configuration.
//!
//! Loaded once from YAML (or built from the defaults below) and handed to the
//! pipeline as an immutable [`Settings`] value.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Territory hidden from summaries unless disabled.
pub const DEFAULT_EXCLUDED_TERRITORY: &str = "UK";

const DEFAULT_STANDARD_RATES: &[(&str, f64)] = &[
    ("AT", 20.0),
    ("BE", 21.0),
    ("BG", 20.0),
    ("CY", 19.0),
    ("CZ", 21.0),
    ("DE", 19.0),
    ("DK", 25.0),
    ("EE", 22.0),
    ("ES", 21.0),
    ("FI", 24.0),
    ("FR", 20.0),
    ("GR", 24.0),
    ("HR", 25.0),
    ("HU", 27.0),
    ("IE", 23.0),
    ("IT", 22.0),
    ("LT", 21.0),
    ("LU", 17.0),
    ("LV", 21.0),
    ("MT", 18.0),
    ("NL", 21.0),
    ("PL", 23.0),
    ("PT", 23.0),
    ("RO", 19.0),
    ("SE", 25.0),
    ("SI", 22.0),
    ("SK", 20.0),
    ("UK", 20.0),
];

/// Standard VAT rate (percent) per upper-case country code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable(BTreeMap<String, f64>);

impl RateTable {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|(code, rate)| (code.as_ref().trim().to_uppercase(), rate))
                .collect(),
        )
    }

    pub fn get(&self, country: &str) -> Option<f64> {
        self.0.get(&country.trim().to_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    #[serde(default)]
    pub standard_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub hide_uk: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { hide_uk: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_territory() -> String {
    DEFAULT_EXCLUDED_TERRITORY.to_string()
}

/// On-disk configuration file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countries: BTreeMap<String, CountryConfig>,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default = "default_territory")]
    pub excluded_territory: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries: DEFAULT_STANDARD_RATES
                .iter()
                .map(|(code, rate)| {
                    (
                        code.to_string(),
                        CountryConfig {
                            standard_rate: *rate,
                        },
                    )
                })
                .collect(),
            ui: UiConfig::default(),
            excluded_territory: default_territory(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_yaml::from_reader(reader).with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(input).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (code, country) in &self.countries {
            ensure!(
                country.standard_rate.is_finite() && country.standard_rate >= 0.0,
                "Standard rate for '{code}' must be a non-negative number"
            );
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        let territory = self.excluded_territory.trim().to_uppercase();
        Settings {
            rates: RateTable::new(
                self.countries
                    .iter()
                    .map(|(code, country)| (code.as_str(), country.standard_rate)),
            ),
            excluded_territory: (self.ui.hide_uk && !territory.is_empty()).then_some(territory),
        }
    }
}

/// Immutable pipeline inputs derived from a [`Config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub rates: RateTable,
    pub excluded_territory: Option<String>,
}
