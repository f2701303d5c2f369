use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_EMISSIONS_PATH: &str = "data/co2_v2.csv";
pub const DEFAULT_TEMPERATURE_PATH: &str = "data/Temperature.csv";

/// Where the two datasets are read from.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "co2-insights",
    version,
    about = "CO2 emission and temperature trends dashboard"
)]
pub struct AppConfig {
    /// Emissions table (.csv, .json or .parquet).
    #[arg(value_name = "EMISSIONS_FILE", default_value = DEFAULT_EMISSIONS_PATH)]
    pub emissions_path: PathBuf,

    /// Temperature table (.csv, .json or .parquet).
    #[arg(value_name = "TEMPERATURE_FILE", default_value = DEFAULT_TEMPERATURE_PATH)]
    pub temperature_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            emissions_path: PathBuf::from(DEFAULT_EMISSIONS_PATH),
            temperature_path: PathBuf::from(DEFAULT_TEMPERATURE_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults_without_arguments() {
        let cfg = AppConfig::try_parse_from(["co2-insights"]).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn positional_paths_override_defaults() {
        let cfg = AppConfig::try_parse_from(["co2-insights", "e.parquet"]).unwrap();
        assert_eq!(cfg.emissions_path, PathBuf::from("e.parquet"));
        assert_eq!(cfg.temperature_path, PathBuf::from(DEFAULT_TEMPERATURE_PATH));

        let cfg = AppConfig::try_parse_from(["co2-insights", "e.csv", "t.json"]).unwrap();
        assert_eq!(cfg.temperature_path, PathBuf::from("t.json"));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        let err = AppConfig::try_parse_from(["co2-insights", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn help_flag_prints_usage_instead_of_loading_a_file() {
        let err = AppConfig::try_parse_from(["co2-insights", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
