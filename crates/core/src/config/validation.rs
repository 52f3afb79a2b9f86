use thiserror::Error;

/// Raised while reading or checking environment-driven settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {field}: {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value '{value}' for {field}, expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Setting the error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field, .. } | Self::InvalidValue { field, .. } => field,
        }
    }
}

/// A reusable check applied to one parsed setting
pub trait ConfigValidator<T> {
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Accepts ports inside `min..=max`
pub struct PortValidator {
    pub field: &'static str,
    pub min: u16,
    pub max: u16,
}

impl Default for PortValidator {
    fn default() -> Self {
        Self {
            field: "port",
            min: 1,
            max: 65535,
        }
    }
}

impl ConfigValidator<u16> for PortValidator {
    fn validate(&self, value: &u16) -> Result<(), ConfigError> {
        if (self.min..=self.max).contains(value) {
            return Ok(());
        }
        Err(ConfigError::invalid_value(
            self.field,
            value.to_string(),
            format!("a port in {}..={}", self.min, self.max),
        ))
    }
}

/// Rejects empty or whitespace-only strings
pub struct NonEmptyValidator {
    pub field: &'static str,
    pub hint: &'static str,
}

impl ConfigValidator<String> for NonEmptyValidator {
    fn validate(&self, value: &String) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::missing_required(self.field, self.hint));
        }
        Ok(())
    }
}
