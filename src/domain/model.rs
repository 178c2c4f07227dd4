use std::fmt;

/// One of the fixed patient attributes recognised regardless of input
/// column naming. Declaration order is the output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Practice,
    FirstName,
    LastName,
    Dob,
    Gender,
    Address,
    City,
    State,
    ZipCode,
    EmailAddress,
    Ssn,
    Mrn,
    MobilePhone,
    HomePhone,
}

impl CanonicalField {
    pub const COUNT: usize = 14;

    pub const ALL: [CanonicalField; Self::COUNT] = [
        CanonicalField::Practice,
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Dob,
        CanonicalField::Gender,
        CanonicalField::Address,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::ZipCode,
        CanonicalField::EmailAddress,
        CanonicalField::Ssn,
        CanonicalField::Mrn,
        CanonicalField::MobilePhone,
        CanonicalField::HomePhone,
    ];

    /// Fields that must carry at least one value across the whole table.
    pub const REQUIRED: [CanonicalField; 5] = [
        CanonicalField::Practice,
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Dob,
        CanonicalField::Gender,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::Practice => "Practice",
            CanonicalField::FirstName => "First Name",
            CanonicalField::LastName => "Last Name",
            CanonicalField::Dob => "DOB",
            CanonicalField::Gender => "Gender",
            CanonicalField::Address => "Address",
            CanonicalField::City => "City",
            CanonicalField::State => "State",
            CanonicalField::ZipCode => "Zip Code",
            CanonicalField::EmailAddress => "Email Address",
            CanonicalField::Ssn => "SSN",
            CanonicalField::Mrn => "MRN",
            CanonicalField::MobilePhone => "Mobile Phone",
            CanonicalField::HomePhone => "Home Phone",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(wanted))
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Header row plus string cells, as handed over by the spreadsheet reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadsheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SpreadsheetTable {
    /// Builds a table, padding short rows with empty cells so every row has
    /// one value per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A patient row with a value for every canonical field. Missing data is an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRecord {
    values: [String; CanonicalField::COUNT],
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn with(mut self, field: CanonicalField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> + '_ {
        CanonicalField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}

/// Login for the patient service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub customer_key: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("customer_key", &self.customer_key)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    Error(String),
}

impl SubmissionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub patient_id: Option<String>,
    pub case_ids: Vec<String>,
    pub status: SubmissionStatus,
}

impl SubmissionResult {
    pub fn success(patient_id: impl Into<String>, case_ids: Vec<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            case_ids,
            status: SubmissionStatus::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            patient_id: None,
            case_ids: Vec::new(),
            status: SubmissionStatus::Error(message.into()),
        }
    }
}

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_ERROR: &str = "Unknown Error";
pub const STATUS_SUCCESS: &str = "Success";

pub const RESULT_COLUMNS: [&str; 3] = ["PatientID", "CaseID", "Status"];

/// A normalized record with its submission outcome flattened into
/// display columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub record: CanonicalRecord,
    pub patient_id: String,
    pub case_id: String,
    pub status: String,
}

impl OutputRecord {
    pub fn new(record: CanonicalRecord, result: SubmissionResult) -> Self {
        let patient_id = result
            .patient_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let case_id = if result.case_ids.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            result.case_ids.join(", ")
        };
        let status = match result.status {
            SubmissionStatus::Success => STATUS_SUCCESS.to_string(),
            SubmissionStatus::Error(message) if message.trim().is_empty() => {
                UNKNOWN_ERROR.to_string()
            }
            SubmissionStatus::Error(message) => message,
        };

        Self {
            record,
            patient_id,
            case_id,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn headers() -> Vec<&'static str> {
        CanonicalField::ALL
            .iter()
            .map(|field| field.label())
            .chain(RESULT_COLUMNS)
            .collect()
    }

    /// Cell values in header order.
    pub fn values(&self) -> Vec<&str> {
        self.record
            .iter()
            .map(|(_, value)| value)
            .chain([
                self.patient_id.as_str(),
                self.case_id.as_str(),
                self.status.as_str(),
            ])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_record_is_total() {
        let record = CanonicalRecord::new();
        assert_eq!(record.iter().count(), CanonicalField::COUNT);
        assert!(record.iter().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn test_field_labels_round_trip_case_insensitively() {
        assert_eq!(
            CanonicalField::from_label("zip code"),
            Some(CanonicalField::ZipCode)
        );
        assert_eq!(CanonicalField::from_label(" DOB "), Some(CanonicalField::Dob));
        assert_eq!(CanonicalField::from_label("nickname"), None);
    }

    #[test]
    fn test_output_record_placeholders_on_failure() {
        let output = OutputRecord::new(
            CanonicalRecord::new(),
            SubmissionResult::error("DOB field is missing or empty"),
        );
        assert_eq!(output.patient_id, "N/A");
        assert_eq!(output.case_id, "N/A");
        assert_eq!(output.status, "DOB field is missing or empty");
        assert!(!output.is_success());
    }

    #[test]
    fn test_output_record_blank_error_renders_unknown() {
        let output = OutputRecord::new(CanonicalRecord::new(), SubmissionResult::error("  "));
        assert_eq!(output.status, "Unknown Error");
    }

    #[test]
    fn test_output_record_joins_case_ids_in_order() {
        let output = OutputRecord::new(
            CanonicalRecord::new(),
            SubmissionResult::success("1001", vec!["7".to_string(), "3".to_string()]),
        );
        assert_eq!(output.patient_id, "1001");
        assert_eq!(output.case_id, "7, 3");
        assert!(output.is_success());
    }

    #[test]
    fn test_output_headers_follow_canonical_order() {
        let headers = OutputRecord::headers();
        assert_eq!(headers.len(), CanonicalField::COUNT + 3);
        assert_eq!(headers[0], "Practice");
        assert_eq!(headers[13], "Home Phone");
        assert_eq!(&headers[14..], &["PatientID", "CaseID", "Status"]);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            customer_key: "key".to_string(),
            user: "user@example.com".to_string(),
            password: "s3cret".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
