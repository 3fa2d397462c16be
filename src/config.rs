use anyhow::Context;
use std::env::VarError;
use std::str::FromStr;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug)]
pub struct Config {
    database_url: String,
    database_max_connections: u32,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = load_env("DATABASE_URL")?;
        let database_max_connections = load_env_or(
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?;
        let server_port = load_env("SERVER_PORT")?;
        Ok(Self {
            database_url,
            database_max_connections,
            server_port,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn load_env<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    parse_env(key, std::env::var(key))?
        .with_context(|| format!("Failed to load environment variable {key}"))
}

fn load_env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_env(key, std::env::var(key))?.unwrap_or(default))
}

/// Parses a raw lookup result. An unset variable yields `Ok(None)`.
fn parse_env<T>(key: &str, raw: Result<String, VarError>) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let val = match raw {
        Ok(val) => val,
        Err(VarError::NotPresent) => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to load environment variable {key}"));
        }
    };
    val.parse::<T>()
        .map(Some)
        .with_context(|| format!("Failed to parse environment variable {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_present_value() {
        let port: Option<u16> = parse_env("SERVER_PORT", Ok("8080".into())).unwrap();
        assert_eq!(port, Some(8080));
    }

    #[test]
    fn missing_value_is_none() {
        let port: Option<u16> = parse_env("SERVER_PORT", Err(VarError::NotPresent)).unwrap();
        assert_eq!(port, None);
    }

    #[test]
    fn unparsable_value_names_the_key() {
        let err = parse_env::<u16>("SERVER_PORT", Ok("eighty".into())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse environment variable SERVER_PORT"
        );
    }

    #[test]
    fn required_variable_must_be_set() {
        let err = load_env::<String>("BOOK_CATALOG_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("BOOK_CATALOG_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn optional_variable_falls_back_to_default() {
        let value = load_env_or("BOOK_CATALOG_SURELY_UNSET_VARIABLE", 5_u32).unwrap();
        assert_eq!(value, 5);
    }
}
