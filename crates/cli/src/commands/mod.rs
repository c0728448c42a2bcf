//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use coach_exchange_store::Env;
use coach_exchange_store::postgres::create_pool;

/// Variables checked for the database URL, in order.
const DATABASE_URL_VARS: [&str; 3] = [
    "DATABASE_URL",
    "STOREFRONT_DATABASE_URL",
    "ADMIN_DATABASE_URL",
];

/// The first database URL set in the environment.
fn database_url<F>(env: &Env<F>) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    DATABASE_URL_VARS
        .iter()
        .find_map(|key| env.optional(key))
        .map(SecretString::from)
}

/// Connect to the database named by the environment.
///
/// # Errors
///
/// Returns an error if no URL is set or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let url = database_url(&Env::process())
        .ok_or_else(|| format!("Set one of {}", DATABASE_URL_VARS.join(", ")))?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&url).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_database_url_fallback_order() {
        let env = Env::new(|key: &str| match key {
            "STOREFRONT_DATABASE_URL" => Some("postgres://storefront".to_string()),
            "ADMIN_DATABASE_URL" => Some("postgres://admin".to_string()),
            _ => None,
        });
        let url = database_url(&env).unwrap();
        assert_eq!(url.expose_secret(), "postgres://storefront");

        let empty = Env::new(|_: &str| -> Option<String> { None });
        assert!(database_url(&empty).is_none());
    }
}
