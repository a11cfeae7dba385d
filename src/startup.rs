use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::Config;

pub struct ValidationReport {
    pub environment: bool,
    pub database: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.database
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Database Connectivity: {}", status(self.database));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

pub async fn validate_environment(config: &Config, pool: &PgPool) -> Result<ValidationReport> {
    let mut report = ValidationReport {
        environment: true,
        database: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    if let Err(e) = validate_database(pool).await {
        report.database = false;
        report.errors.push(format!("Database: {}", e));
    }

    Ok(report)
}

fn validate_env_vars(config: &Config) -> Result<()> {
    if config.database_url.is_empty() {
        anyhow::bail!("DATABASE_URL is empty");
    }
    if config.auth_token_secret.is_empty() {
        anyhow::bail!("AUTH_TOKEN_SECRET is empty");
    }
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }

    Ok(())
}

async fn validate_database(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Failed to connect to database")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to check migrations table")?;

    if applied == 0 {
        anyhow::bail!("No migrations applied");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_env_vars_empty_database_url() {
        let config = Config {
            server_port: 4000,
            database_url: String::new(),
            auth_token_secret: "secret".to_string(),
            cors_allowed_origins: None,
        };

        assert!(validate_env_vars(&config).is_err());
    }

    #[test]
    fn test_validate_env_vars_empty_secret() {
        let config = Config {
            server_port: 4000,
            database_url: "postgres://localhost:5432/test".to_string(),
            auth_token_secret: String::new(),
            cors_allowed_origins: None,
        };

        assert!(validate_env_vars(&config).is_err());
    }

    #[test]
    fn test_validate_env_vars_ok() {
        let config = Config {
            server_port: 4000,
            database_url: "postgres://localhost:5432/test".to_string(),
            auth_token_secret: "secret".to_string(),
            cors_allowed_origins: Some("http://localhost:5173".to_string()),
        };

        assert!(validate_env_vars(&config).is_ok());
    }
}
