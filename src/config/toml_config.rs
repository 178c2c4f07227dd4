use crate::adapters::soap::{DEFAULT_TIMEOUT_SECS, DEFAULT_WSDL_URL};
use crate::core::ConfigProvider;
use crate::domain::model::{CanonicalField, Credentials};
use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::{
    validate_date_format, validate_file_extension, validate_non_empty_string,
    validate_output_formats, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub credentials: CredentialsConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub geocoding: Option<GeocodingConfig>,
    /// Extra header variants keyed by canonical field label.
    pub columns: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_wsdl_url")]
    pub wsdl_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            wsdl_url: default_wsdl_url(),
            timeout_seconds: None,
        }
    }
}

fn default_wsdl_url() -> String {
    DEFAULT_WSDL_URL.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub customer_key: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("customer_key", &self.customer_key)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_output_formats")]
    pub formats: Vec<String>,
    pub dob_format: Option<String>,
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub postal_data: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IntakeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IntakeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("service.wsdl_url", &self.service.wsdl_url)?;
        if let Some(timeout) = self.service.timeout_seconds {
            validate_positive_number("service.timeout_seconds", timeout, 1)?;
        }

        // An unresolved ${VAR} means the secret was never provided.
        for (field, value) in [
            ("credentials.customer_key", &self.credentials.customer_key),
            ("credentials.user", &self.credentials.user),
            ("credentials.password", &self.credentials.password),
        ] {
            validate_non_empty_string(field, value)?;
            if value.starts_with("${") && value.ends_with('}') {
                return Err(IntakeError::MissingConfigError {
                    field: format!("{} ({})", field, value),
                });
            }
        }

        validate_path("input.path", &self.input.path)?;
        validate_file_extension("input.path", &self.input.path, &["csv"])?;
        validate_path("output.path", &self.output.path)?;
        validate_output_formats("output.formats", &self.output.formats)?;
        if let Some(format) = &self.output.dob_format {
            validate_date_format("output.dob_format", format)?;
        }

        if let Some(geocoding) = &self.geocoding {
            validate_path("geocoding.postal_data", &geocoding.postal_data)?;
        }

        if let Some(columns) = &self.columns {
            for label in columns.keys() {
                if CanonicalField::from_label(label).is_none() {
                    return Err(IntakeError::InvalidConfigValueError {
                        field: "columns".to_string(),
                        value: label.clone(),
                        reason: "Unknown canonical field".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn wsdl_url(&self) -> &str {
        &self.service.wsdl_url
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            customer_key: self.credentials.customer_key.clone(),
            user: self.credentials.user.clone(),
            password: self.credentials.password.clone(),
        }
    }

    fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    fn postal_data_path(&self) -> Option<&str> {
        self.geocoding.as_ref().map(|g| g.postal_data.as_str())
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn dob_output_format(&self) -> Option<&str> {
        self.output.dob_format.as_deref()
    }

    fn extra_column_variants(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.columns.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
