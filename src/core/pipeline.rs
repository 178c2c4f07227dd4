use crate::adapters::postal::{GeoNamesLookup, NoPostalLookup};
use crate::adapters::soap::SoapClient;
use crate::adapters::spreadsheet::{read_table, write_csv, write_json, OutputOptions};
use crate::adapters::storage::output_file_path;
use crate::core::batch::BatchProcessor;
use crate::core::columns::{resolve, ColumnMap};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{CanonicalRecord, OutputRecord};
use crate::domain::ports::PostalLookup;
use crate::utils::error::{IntakeError, Result};
use std::time::Duration;

pub const OUTPUT_FILE_STEM: &str = "patient_results";

/// Spreadsheet in, one CreatePatient call per row, annotated results out.
pub struct IntakePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> IntakePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn column_map(&self) -> Result<ColumnMap> {
        match self.config.extra_column_variants() {
            Some(extra) => ColumnMap::default().with_extra_variants(extra),
            None => Ok(ColumnMap::default()),
        }
    }

    async fn postal_lookup(&self) -> Result<Box<dyn PostalLookup>> {
        match self.config.postal_data_path() {
            Some(path) => {
                tracing::debug!("Loading postal data from {}", path);
                let data = self.storage.read_file(path).await?;
                Ok(Box::new(GeoNamesLookup::from_bytes(&data)?))
            }
            None => {
                tracing::debug!("No postal data configured, skipping location enrichment");
                Ok(Box::new(NoPostalLookup))
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for IntakePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<CanonicalRecord>> {
        tracing::debug!("Reading patient spreadsheet: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        let table = read_table(&data)?;
        resolve(&table, &self.column_map()?)
    }

    async fn transform(&self, records: Vec<CanonicalRecord>) -> Result<Vec<OutputRecord>> {
        // Setup failures abort the batch before any record is submitted.
        let timeout = Duration::from_secs(self.config.timeout_seconds());
        let client = SoapClient::connect(self.config.wsdl_url(), timeout).await?;
        tracing::debug!("Submitting {} records to {}", records.len(), client.endpoint());
        let header = client.build_header(&self.config.credentials())?;
        let lookup = self.postal_lookup().await?;

        let processor = BatchProcessor::new(&client, &header, lookup.as_ref());
        Ok(processor.run(records).await)
    }

    async fn load(&self, results: Vec<OutputRecord>) -> Result<String> {
        let options = OutputOptions {
            dob_format: self.config.dob_output_format().map(str::to_string),
        };

        let mut written = Vec::new();
        for format in self.config.output_formats() {
            let data = match format.as_str() {
                "csv" => write_csv(&results, &options)?,
                "json" => write_json(&results, &options)?,
                other => {
                    return Err(IntakeError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported output format".to_string(),
                    })
                }
            };

            let file_name = format!("{}.{}", OUTPUT_FILE_STEM, format);
            let path = output_file_path(self.config.output_path(), &file_name);
            self.storage.write_file(&path, &data).await?;
            tracing::debug!("Wrote {} ({} bytes)", path, data.len());
            written.push(path);
        }

        written
            .into_iter()
            .next()
            .ok_or_else(|| IntakeError::MissingConfigError {
                field: "output_formats".to_string(),
            })
    }
}
