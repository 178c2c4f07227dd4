use crate::domain::model::{CanonicalRecord, Credentials, OutputRecord};
use crate::domain::payload::{CreatedPatient, PatientPayload, Place, RequestHeader, ServiceError};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn wsdl_url(&self) -> &str;
    fn credentials(&self) -> Credentials;
    fn timeout_seconds(&self) -> u64;
    fn postal_data_path(&self) -> Option<&str>;
    fn output_formats(&self) -> &[String];

    fn dob_output_format(&self) -> Option<&str> {
        None
    }

    /// Header variants appended to the built-in ones, keyed by field label.
    fn extra_column_variants(&self) -> Option<&HashMap<String, Vec<String>>> {
        None
    }
}

/// Creates patients in the external practice-management system.
#[async_trait]
pub trait PatientService: Send + Sync {
    async fn create_patient(
        &self,
        header: &RequestHeader,
        patient: &PatientPayload,
    ) -> std::result::Result<CreatedPatient, ServiceError>;
}

/// Resolves a postal code to a place.
pub trait PostalLookup: Send + Sync {
    fn lookup(&self, postal_code: &str) -> Option<Place>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CanonicalRecord>>;
    async fn transform(&self, records: Vec<CanonicalRecord>) -> Result<Vec<OutputRecord>>;
    async fn load(&self, results: Vec<OutputRecord>) -> Result<String>;
}
