use crate::adapters::soap::{DEFAULT_TIMEOUT_SECS, DEFAULT_WSDL_URL};
use crate::core::ConfigProvider;
use crate::domain::model::Credentials;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_date_format, validate_file_extension, validate_non_empty_string,
    validate_output_formats, validate_path, validate_positive_number, validate_url, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "patient-intake")]
#[command(about = "Submit a spreadsheet of patients to the practice-management service")]
pub struct CliConfig {
    /// Patient spreadsheet (CSV)
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_WSDL_URL)]
    pub wsdl_url: String,

    #[arg(long, env = "INTAKE_CUSTOMER_KEY", hide_env_values = true)]
    pub customer_key: String,

    #[arg(long, env = "INTAKE_USER")]
    pub user: String,

    #[arg(long, env = "INTAKE_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// GeoNames postal dump used to fill in City and State
    #[arg(long)]
    pub postal_data: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub output_formats: Vec<String>,

    /// Re-render DOB in the output, e.g. %m-%d-%Y
    #[arg(long)]
    pub dob_format: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn wsdl_url(&self) -> &str {
        &self.wsdl_url
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            customer_key: self.customer_key.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn postal_data_path(&self) -> Option<&str> {
        self.postal_data.as_deref()
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn dob_output_format(&self) -> Option<&str> {
        self.dob_format.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &["csv"])?;
        validate_path("output_path", &self.output_path)?;
        validate_url("wsdl_url", &self.wsdl_url)?;
        validate_non_empty_string("customer_key", &self.customer_key)?;
        validate_non_empty_string("user", &self.user)?;
        validate_non_empty_string("password", &self.password)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validate_output_formats("output_formats", &self.output_formats)?;

        if let Some(path) = &self.postal_data {
            validate_path("postal_data", path)?;
        }
        if let Some(format) = &self.dob_format {
            validate_date_format("dob_format", format)?;
        }
        Ok(())
    }
}
