use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("broker.kafka_broker_url must not be empty")]
    MissingBrokerUrl,

    #[error("database.database_url must not be empty")]
    MissingDatabaseUrl,

    #[error("server.max_payload_bytes must be positive")]
    InvalidPayloadLimit,
}

/// Validate the entire configuration.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_broker(config)?;
    validate_database(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_broker(config: &Config) -> Result<(), ValidationError> {
    if config.broker.kafka_broker_url.trim().is_empty() {
        return Err(ValidationError::MissingBrokerUrl);
    }
    Ok(())
}

fn validate_database(config: &Config) -> Result<(), ValidationError> {
    if config.database.database_url.trim().is_empty() {
        return Err(ValidationError::MissingDatabaseUrl);
    }
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_payload_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidPayloadLimit);
    }
    Ok(())
}
