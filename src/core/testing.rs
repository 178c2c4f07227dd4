use crate::domain::model::{CanonicalField, CanonicalRecord, Credentials};
use crate::domain::payload::{CreatedPatient, PatientPayload, RequestHeader, ServiceError};
use crate::domain::ports::PatientService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Records every payload it receives. Fails for configured first names,
/// otherwise hands out sequential ids starting at 1000 (cases at 5000).
pub struct RecordingService {
    calls: Mutex<Vec<PatientPayload>>,
    failures: HashMap<String, ServiceError>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: HashMap::new(),
        }
    }

    pub fn fail_for(mut self, first_name: &str, error: ServiceError) -> Self {
        self.failures.insert(first_name.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<PatientPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PatientService for RecordingService {
    async fn create_patient(
        &self,
        _header: &RequestHeader,
        patient: &PatientPayload,
    ) -> Result<CreatedPatient, ServiceError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(patient.clone());
            calls.len() - 1
        };

        if let Some(error) = self.failures.get(&patient.first_name) {
            return Err(error.clone());
        }

        Ok(CreatedPatient {
            patient_id: (1000 + index).to_string(),
            case_ids: vec![(5000 + index).to_string()],
        })
    }
}

pub fn header() -> RequestHeader {
    RequestHeader::from_credentials(&Credentials {
        customer_key: "customer-key".to_string(),
        user: "intake@example.com".to_string(),
        password: "secret".to_string(),
    })
}

pub fn record(first_name: &str, dob: &str) -> CanonicalRecord {
    CanonicalRecord::new()
        .with(CanonicalField::Practice, "PEDIATRICS WEST")
        .with(CanonicalField::FirstName, first_name)
        .with(CanonicalField::LastName, "Tester")
        .with(CanonicalField::Dob, dob)
        .with(CanonicalField::Gender, "Female")
}
