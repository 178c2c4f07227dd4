//! Turns one normalized record into one CreatePatient call and maps every
//! outcome, including local validation failures, into a `SubmissionResult`.

use crate::core::dates::parse_date;
use crate::domain::model::{CanonicalField, CanonicalRecord, SubmissionResult};
use crate::domain::payload::{PatientPayload, RequestHeader};
use crate::domain::ports::PatientService;

pub const DOB_MISSING: &str = "DOB field is missing or empty";

pub async fn submit(
    service: &dyn PatientService,
    header: &RequestHeader,
    record: &CanonicalRecord,
) -> SubmissionResult {
    let dob = record.get(CanonicalField::Dob);
    if dob.trim().is_empty() {
        return SubmissionResult::error(DOB_MISSING);
    }

    let Some(date_of_birth) = parse_date(dob) else {
        return SubmissionResult::error(format!("Invalid date format for DOB: '{}'", dob));
    };

    let payload = match PatientPayload::from_record(record, date_of_birth) {
        Ok(payload) => payload,
        Err(e) => return SubmissionResult::error(e.to_string()),
    };

    match service.create_patient(header, &payload).await {
        Ok(created) => SubmissionResult::success(created.patient_id, created.case_ids),
        Err(e) => {
            tracing::debug!("CreatePatient failed: {:?}", e);
            SubmissionResult::error(e.to_string())
        }
    }
}
