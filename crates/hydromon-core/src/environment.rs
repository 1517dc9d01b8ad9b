//! Pre-flight checks. Anything failing here aborts the run before a single
//! row is read.

use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::db;
use crate::error::EnvironmentError;
use crate::seed;
use crate::store::PgStore;

/// Account the process runs as: `DOMAIN\user` where a domain is known.
pub fn current_account() -> String {
    let user = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "unknown".to_string());
    match std::env::var("USERDOMAIN") {
        Ok(domain) if !domain.is_empty() => format!("{domain}\\{user}"),
        _ => user,
    }
}

pub fn check_credentials(expected: &[String]) -> Result<(), EnvironmentError> {
    check_account(&current_account(), expected)
}

pub fn check_account(actual: &str, expected: &[String]) -> Result<(), EnvironmentError> {
    if expected.is_empty() {
        debug!(account = actual, "No expected accounts configured; skipping credential check");
        return Ok(());
    }
    if expected
        .iter()
        .any(|account| account.to_uppercase() == actual.to_uppercase())
    {
        return Ok(());
    }
    Err(EnvironmentError::Credentials {
        expected: expected.to_vec(),
        actual: actual.to_string(),
    })
}

/// Connects to the target database and confirms the schema and the coded
/// domains behind its equipment columns are in place.
pub async fn connect_target(
    database_url: &str,
    config: &DatabaseConfig,
) -> Result<PgStore, EnvironmentError> {
    let pool = db::connect(database_url, config)
        .await
        .map_err(|err| EnvironmentError::Unreachable {
            message: format!("{err:#}"),
        })?;
    let missing = db::missing_tables(&pool)
        .await
        .map_err(|err| EnvironmentError::Unreachable {
            message: format!("{err:#}"),
        })?;
    if !missing.is_empty() {
        return Err(EnvironmentError::Schema { missing });
    }
    let domains = db::unseeded_domains(&pool, seed::EQUIPMENT_DOMAINS.iter().copied())
        .await
        .map_err(|err| EnvironmentError::Unreachable {
            message: format!("{err:#}"),
        })?;
    if !domains.is_empty() {
        return Err(EnvironmentError::Unseeded { domains });
    }
    info!("Connected to target store");
    Ok(PgStore::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_match_ignores_case() {
        let expected = vec!["HYDRO\\Loader".to_string()];
        assert!(check_account("hydro\\LOADER", &expected).is_ok());

        let err = check_account("HYDRO\\someone", &expected).unwrap_err();
        assert!(matches!(err, EnvironmentError::Credentials { .. }));
        assert!(err.to_string().contains("HYDRO\\someone"));
    }

    #[test]
    fn empty_expectation_skips_the_check() {
        assert!(check_account("anyone", &[]).is_ok());
    }

    #[test]
    fn unseeded_target_names_the_domains_and_the_fix() {
        let err = EnvironmentError::Unseeded {
            domains: seed::EQUIPMENT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        };
        let message = err.to_string();
        assert!(message.contains("Data Logger Type, Sensor Type"));
        assert!(message.contains("db-seed"));
    }
}
