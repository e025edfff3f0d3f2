use anyhow::{Context, Result, anyhow};
use storage::services::rating::{DEFAULT_ELO_K_FACTOR, RatingStrategy};
use storage::services::results::{ResubmissionPolicy, ResultsSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub api_keys: String,
    pub results: ResultsSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            database_max_connections: match std::env::var("DATABASE_MAX_CONNECTIONS") {
                Ok(value) => value
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a number")?,
                Err(_) => 10,
            },
            jwt_secret: std::env::var("JWT_SECRET")
                .context("Cannot load JWT_SECRET env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            results: results_settings(
                std::env::var("RATING_STRATEGY").ok().as_deref(),
                std::env::var("ELO_K_FACTOR").ok().as_deref(),
                std::env::var("RESULTS_RESUBMISSION").ok().as_deref(),
            )?,
        })
    }
}

/// Rating strategy and resubmission policy, defaulting to placement / compound
fn results_settings(
    strategy: Option<&str>,
    k_factor: Option<&str>,
    resubmission: Option<&str>,
) -> Result<ResultsSettings> {
    let k_factor = match k_factor {
        Some(value) => value
            .parse::<f64>()
            .context("ELO_K_FACTOR must be a number")?,
        None => DEFAULT_ELO_K_FACTOR,
    };

    let strategy = match strategy {
        Some(name) => RatingStrategy::from_name(name, k_factor).map_err(|e| anyhow!(e))?,
        None => RatingStrategy::default(),
    };

    let resubmission = match resubmission {
        Some(value) => value
            .parse::<ResubmissionPolicy>()
            .map_err(|e| anyhow!(e))?,
        None => ResubmissionPolicy::default(),
    };

    Ok(ResultsSettings {
        strategy,
        resubmission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_defaults() {
        let settings = results_settings(None, None, None).unwrap();
        assert_eq!(settings.strategy, RatingStrategy::Placement);
        assert_eq!(settings.resubmission, ResubmissionPolicy::Compound);
    }

    #[test]
    fn test_elo_with_custom_k() {
        let settings = results_settings(Some("elo"), Some("16"), Some("revert")).unwrap();
        assert_eq!(settings.strategy, RatingStrategy::Elo { k_factor: 16.0 });
        assert_eq!(settings.resubmission, ResubmissionPolicy::Revert);
    }

    #[test]
    fn test_unknown_values_fail() {
        assert!(results_settings(Some("trueskill"), None, None).is_err());
        assert!(results_settings(None, Some("many"), None).is_err());
        assert!(results_settings(None, None, Some("sometimes")).is_err());
    }
}
