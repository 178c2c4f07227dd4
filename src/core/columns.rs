//! Maps spreadsheet header variants onto the canonical field set.

use crate::domain::model::{CanonicalField, CanonicalRecord, SpreadsheetTable};
use crate::utils::error::{IntakeError, Result};
use std::collections::HashMap;

/// Accepted header spellings per canonical field, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    variants: Vec<Vec<String>>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        let variants = CanonicalField::ALL
            .iter()
            .map(|field| {
                default_variants(*field)
                    .iter()
                    .map(|variant| variant.to_string())
                    .collect()
            })
            .collect();
        Self { variants }
    }
}

fn default_variants(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::Practice => &["practice", "practice name"],
        CanonicalField::FirstName => &["first name", "firstname", "first"],
        CanonicalField::LastName => &["last name", "lastname", "last", "surname"],
        CanonicalField::Dob => &["dob", "date of birth", "birthdate"],
        CanonicalField::Gender => &["gender", "sex"],
        CanonicalField::Address => &["address", "address line 1", "addressline1"],
        CanonicalField::City => &["city"],
        CanonicalField::State => &["state", "state code"],
        CanonicalField::ZipCode => &["zip", "zip code", "zipcode", "postal code", "postalcode"],
        CanonicalField::EmailAddress => &["email", "email address"],
        CanonicalField::Ssn => &[
            "ssn",
            "social security number",
            "social security number (ssn)",
        ],
        CanonicalField::Mrn => &["mrn", "medical record number", "medical record number (mrn)"],
        CanonicalField::MobilePhone => &["mobile phone", "mobile", "cell phone"],
        CanonicalField::HomePhone => &["home phone", "phone"],
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

impl ColumnMap {
    pub fn variants(&self, field: CanonicalField) -> &[String] {
        &self.variants[field.index()]
    }

    /// Appends configured variants after the built-in ones. Keys are field
    /// labels such as `"Zip Code"`.
    pub fn with_extra_variants(mut self, extra: &HashMap<String, Vec<String>>) -> Result<Self> {
        for (label, variants) in extra {
            let field = CanonicalField::from_label(label).ok_or_else(|| {
                IntakeError::InvalidConfigValueError {
                    field: "columns".to_string(),
                    value: label.clone(),
                    reason: "Unknown canonical field".to_string(),
                }
            })?;
            let index = field.index();
            for variant in variants {
                let variant = normalize_header(variant);
                if !variant.is_empty() && !self.variants[index].contains(&variant) {
                    self.variants[index].push(variant);
                }
            }
        }
        Ok(self)
    }

    /// Picks, for every field, the input column of its first variant that is
    /// present. Later variants of the same field are ignored.
    pub fn bind(&self, headers: &[String]) -> ColumnBindings {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let columns = self
            .variants
            .iter()
            .map(|variants| {
                variants
                    .iter()
                    .find_map(|variant| normalized.iter().position(|header| header == variant))
            })
            .collect();

        ColumnBindings {
            columns,
            headers: headers.to_vec(),
        }
    }
}

/// Input column index chosen for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBindings {
    columns: Vec<Option<usize>>,
    headers: Vec<String>,
}

impl ColumnBindings {
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Original header text bound to `field`, if any.
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.column(field).map(|index| self.headers[index].as_str())
    }

    pub fn project(&self, row: &[String]) -> CanonicalRecord {
        let mut record = CanonicalRecord::new();
        for field in CanonicalField::ALL {
            if let Some(value) = self.column(field).and_then(|index| row.get(index)) {
                record.set(field, value.clone());
            }
        }
        record
    }
}

/// Projects every row onto the canonical fields and checks that each
/// required field has data somewhere in the table.
pub fn resolve(table: &SpreadsheetTable, map: &ColumnMap) -> Result<Vec<CanonicalRecord>> {
    let bindings = map.bind(&table.headers);

    for field in CanonicalField::ALL {
        match bindings.header(field) {
            Some(header) => tracing::debug!("Column '{}' bound to {}", header, field),
            None => tracing::debug!("No column found for {}", field),
        }
    }

    let records: Vec<CanonicalRecord> = table.rows.iter().map(|row| bindings.project(row)).collect();

    check_required(&records)?;
    Ok(records)
}

pub fn check_required(records: &[CanonicalRecord]) -> Result<()> {
    for field in CanonicalField::REQUIRED {
        if records
            .iter()
            .all(|record| record.get(field).trim().is_empty())
        {
            tracing::warn!("Required field {} has no data", field);
            return Err(IntakeError::MissingRequiredColumn {
                field: field.label().to_string(),
            });
        }
    }
    Ok(())
}
