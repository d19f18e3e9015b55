//! Loading simulation parameters from disk.
//!
//! The file (TOML, JSON or YAML, by extension) is layered under environment
//! overrides: `SMARTY__NUM_MONTHS=24` replaces `num_months`, and nested keys
//! use the same separator (`SMARTY__TURNOVER__INITIAL_USD`). The result is
//! validated before it is returned.

use std::path::Path;

use ::config::{Config, Environment, File, Map};
use smarty_core::constants::ENV_PREFIX;
use smarty_core::error::ConfigError;
use smarty_core::SimulationParams;
use tracing::info;

/// Load and validate parameters from `path` and the process environment.
pub fn load_params(path: &Path) -> Result<SimulationParams, ConfigError> {
    load_params_with_env(path, None)
}

/// Like [`load_params`], with the environment replaced by `env` when given.
pub fn load_params_with_env(
    path: &Path,
    env: Option<Map<String, String>>,
) -> Result<SimulationParams, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Load(format!("{} does not exist", path.display())));
    }

    let settings = Config::builder()
        .add_source(File::from(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let params: SimulationParams = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    params.validate()?;

    info!(
        path = %path.display(),
        months = params.num_months,
        cohorts = params.investors.len(),
        "parameters loaded"
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarty_core::types::TokenType;
    use std::io::Write;

    const SAMPLE: &str = r#"
num_months = 3
dividend_percent = 0.3
extra_mint_period = 7
dividend_period = 10
min_index_revenue = 0.0001
usd_to_reserve_rate = 300.0
reserve_per_token_rate = 0.5
rng_seed = 42

[risk]
mean = 0.5
std_dev = 0.1

[turnover]
initial_usd = 10000.0
annual_growth_rate = 0.2

[investors]
seed = 10

[genesis_pool]
seed = 1000

[mint_schedule]
seed = [31000, 30000, 30000]
community = [5000, 5000, 5000]

[[tokens]]
token_type = "seed"
initial_price = 0.01

[[tokens]]
token_type = "community"

[[tokens]]
token_type = "staking_rewards"
"#;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_toml_with_defaults() {
        let file = write_toml(SAMPLE);
        let params = load_params_with_env(file.path(), Some(Map::new())).unwrap();
        assert_eq!(params.num_months, 3);
        assert_eq!(params.investors.get(&TokenType::Seed), Some(&10));
        assert_eq!(params.mint_schedule[&TokenType::Seed], vec![31_000, 30_000, 30_000]);
        assert_eq!(params.freeze_period, 10);
        assert_eq!(params.dividend_split, 0.5);
        assert_eq!(params.rebalancing_cohorts, vec![TokenType::Seed]);
        assert_eq!(params.rng_seed, Some(42));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_toml(SAMPLE);
        let env = Map::from([
            ("SMARTY__NUM_MONTHS".to_string(), "2".to_string()),
            ("SMARTY__FREEZE_PERIOD".to_string(), "5".to_string()),
        ]);
        let params = load_params_with_env(file.path(), Some(env)).unwrap();
        assert_eq!(params.num_months, 2);
        assert_eq!(params.freeze_period, 5);
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = load_params(Path::new("/nonexistent/simulation.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn missing_field_is_load_error() {
        let file = write_toml("num_months = 3\n");
        let err = load_params_with_env(file.path(), Some(Map::new())).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let file = write_toml(&SAMPLE.replace("dividend_period = 10", "dividend_period = 0"));
        let err = load_params_with_env(file.path(), Some(Map::new())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name, .. } if name == "dividend_period"));
    }
}
