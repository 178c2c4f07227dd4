use crate::domain::model::{CanonicalField, CanonicalRecord, Credentials};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_CASE_NAME: &str = "Initial Record";

/// Authentication block sent with every request of a batch.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub customer_key: String,
    pub user: String,
    /// Already entity-escaped; the service expects the escaped form inside
    /// the (itself escaped) XML text node.
    pub password: String,
}

impl RequestHeader {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            customer_key: credentials.customer_key.clone(),
            user: credentials.user.clone(),
            password: quick_xml::escape::escape(credentials.password.as_str()).into_owned(),
        }
    }
}

impl fmt::Debug for RequestHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHeader")
            .field("customer_key", &self.customer_key)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRequest {
    pub name: String,
    pub active: bool,
}

impl Default for CaseRequest {
    fn default() -> Self {
        Self {
            name: DEFAULT_CASE_NAME.to_string(),
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("{0} field is missing or empty")]
    MissingField(CanonicalField),
}

/// Wire shape of a CreatePatient request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientPayload {
    pub practice_name: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub email_address: Option<String>,
    pub social_security_number: Option<String>,
    pub medical_record_number: Option<String>,
    pub mobile_phone: Option<String>,
    pub home_phone: Option<String>,
    pub cases: Vec<CaseRequest>,
}

impl PatientPayload {
    pub fn from_record(
        record: &CanonicalRecord,
        date_of_birth: NaiveDate,
    ) -> Result<Self, PayloadError> {
        let required = |field: CanonicalField| -> Result<String, PayloadError> {
            let value = record.get(field);
            if value.trim().is_empty() {
                Err(PayloadError::MissingField(field))
            } else {
                Ok(value.to_string())
            }
        };
        let optional = |field: CanonicalField| -> Option<String> {
            let value = record.get(field);
            (!value.trim().is_empty()).then(|| value.to_string())
        };

        Ok(Self {
            practice_name: required(CanonicalField::Practice)?,
            first_name: required(CanonicalField::FirstName)?,
            last_name: required(CanonicalField::LastName)?,
            date_of_birth,
            gender: required(CanonicalField::Gender)?,
            address_line1: optional(CanonicalField::Address),
            city: optional(CanonicalField::City),
            state: optional(CanonicalField::State),
            zip_code: optional(CanonicalField::ZipCode),
            email_address: optional(CanonicalField::EmailAddress),
            social_security_number: optional(CanonicalField::Ssn),
            medical_record_number: optional(CanonicalField::Mrn),
            mobile_phone: optional(CanonicalField::MobilePhone),
            home_phone: optional(CanonicalField::HomePhone),
            cases: vec![CaseRequest::default()],
        })
    }
}

/// Identifiers returned by a successful CreatePatient call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPatient {
    pub patient_id: String,
    pub case_ids: Vec<String>,
}

/// Failure of one CreatePatient call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service processed the request and rejected the record.
    #[error("{0}")]
    Application(String),
    /// Structured SOAP fault.
    #[error("SOAP Fault: {0}")]
    Fault(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Unexpected(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub place_name: String,
    pub state_code: String,
}
