use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate an outbound call timeout in milliseconds
    pub fn validate_timeout_ms(timeout_ms: u64, field_name: &str) -> ConfigResult<()> {
        if timeout_ms == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if timeout_ms > 3_600_000 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 3600000"
            )));
        }
        Ok(())
    }

    /// Validate that a URL is absolute http(s)
    pub fn validate_http_url(url: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(url, field_name)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must start with http:// or https://"
            )));
        }
        Ok(())
    }
}
