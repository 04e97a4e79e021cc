//! Session configuration and environment overrides.

use ds_analyzer::AnalyzerConfig;
use ds_analyzer::RankOrder;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_highlight::HighlightConfig;
use ds_normalize::NormalizerConfig;

pub const ORDER_ENV: &str = "DOMSPY_ORDER";
pub const PATH_SEPARATOR_ENV: &str = "DOMSPY_PATH_SEPARATOR";
pub const MAX_ATTRIBUTE_LEN_ENV: &str = "DOMSPY_MAX_ATTRIBUTE_LEN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorConfig {
    pub analyzer: AnalyzerConfig,
    pub normalizer: NormalizerConfig,
    pub highlight: HighlightConfig,
}

impl InspectorConfig {
    pub fn validate(&self) -> DomspyResult<()> {
        self.analyzer.validate()?;
        self.normalizer.validate()?;
        self.highlight.validate()
    }

    /// Defaults with `DOMSPY_*` overrides from the process environment.
    pub fn from_env() -> DomspyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DomspyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ORDER_ENV) {
            config.analyzer.order = parse_order(&value)?;
        }

        if let Some(value) = lookup(PATH_SEPARATOR_ENV) {
            config.analyzer.path_separator = value;
        }

        if let Some(value) = lookup(MAX_ATTRIBUTE_LEN_ENV) {
            config.normalizer.max_attribute_len = parse_max_attribute_len(&value)?;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_order(value: &str) -> DomspyResult<RankOrder> {
    RankOrder::from_name(value.trim()).ok_or_else(|| {
        DomspyError::new(
            "config.order_invalid",
            format!("unknown rank order `{value}`; expected nodes, depth or length"),
        )
    })
}

pub fn parse_max_attribute_len(value: &str) -> DomspyResult<usize> {
    value.trim().parse::<usize>().map_err(|error| {
        DomspyError::new(
            "config.max_attribute_len_invalid",
            format!("invalid max attribute length `{value}`: {error}"),
        )
    })
}
