//! SOAP client for the patient management service.

pub mod envelope;
pub mod response;

use crate::domain::model::Credentials;
use crate::domain::payload::{CreatedPatient, PatientPayload, RequestHeader, ServiceError};
use crate::domain::ports::PatientService;
use crate::utils::error::{IntakeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub use envelope::{create_patient_envelope, CREATE_PATIENT_ACTION};
pub use response::{parse_create_patient_response, parse_wsdl_endpoint};

pub const DEFAULT_WSDL_URL: &str =
    "https://webservice.kareo.com/services/soap/2.1/KareoServices.svc?singleWsdl";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A connected SOAP client. Obtained through [`SoapClient::connect`], which
/// fetches the WSDL and resolves the service endpoint from it.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: Client,
    endpoint: String,
}

impl SoapClient {
    pub async fn connect(wsdl_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        tracing::info!("🔌 Connecting to patient service: {}", wsdl_url);

        let response = http
            .get(wsdl_url)
            .send()
            .await
            .map_err(|e| IntakeError::ConnectionError {
                message: format!("WSDL request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntakeError::ConnectionError {
                message: format!("WSDL request returned HTTP {}", status),
            });
        }

        let wsdl = response
            .text()
            .await
            .map_err(|e| IntakeError::ConnectionError {
                message: format!("Could not read WSDL: {}", e),
            })?;

        let endpoint = match parse_wsdl_endpoint(&wsdl).map_err(|e| {
            IntakeError::ConnectionError {
                message: e.to_string(),
            }
        })? {
            Some(location) => location,
            None => endpoint_from_wsdl_url(wsdl_url)?,
        };

        tracing::info!("✅ Service endpoint: {}", endpoint);
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the per-batch request header. Every credential must be
    /// non-blank.
    pub fn build_header(&self, credentials: &Credentials) -> Result<RequestHeader> {
        let fields = [
            ("customer key", &credentials.customer_key),
            ("user", &credentials.user),
            ("password", &credentials.password),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(IntakeError::RequestHeaderError {
                    message: format!("{} is empty", name),
                });
            }
        }

        Ok(RequestHeader::from_credentials(credentials))
    }
}

fn endpoint_from_wsdl_url(wsdl_url: &str) -> Result<String> {
    let mut url = Url::parse(wsdl_url).map_err(|e| IntakeError::ConnectionError {
        message: format!("Invalid WSDL URL '{}': {}", wsdl_url, e),
    })?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

#[async_trait]
impl PatientService for SoapClient {
    async fn create_patient(
        &self,
        header: &RequestHeader,
        patient: &PatientPayload,
    ) -> std::result::Result<CreatedPatient, ServiceError> {
        let envelope = create_patient_envelope(header, patient);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", CREATE_PATIENT_ACTION))
            .body(envelope)
            .send()
            .await?;

        // SOAP faults come back as HTTP 500, so the body is read first.
        let status = response.status();
        let body = response.text().await?;

        match parse_create_patient_response(&body) {
            Err(ServiceError::Unexpected(_)) if !status.is_success() => Err(
                ServiceError::Unexpected(format!("patient service returned HTTP {}", status)),
            ),
            other => other,
        }
    }
}
