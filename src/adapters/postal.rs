//! Postal-code lookups backed by the GeoNames postal dump
//! (`US.txt` from download.geonames.org/export/zip).

use crate::domain::payload::Place;
use crate::domain::ports::PostalLookup;
use crate::utils::error::{IntakeError, Result};
use std::collections::HashMap;
use std::io::Read;

const POSTAL_CODE: usize = 1;
const PLACE_NAME: usize = 2;
const ADMIN_CODE1: usize = 4;

/// Leading five-digit ZIP in `s`, so `53151-1234` and `53151` share a key.
pub fn normalize_zip5(s: &str) -> Option<String> {
    let mut digits = String::with_capacity(5);
    for ch in s.trim().chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            if digits.len() == 5 {
                break;
            }
        } else {
            break;
        }
    }
    if digits.len() == 5 {
        Some(digits)
    } else {
        None
    }
}

fn postal_key(s: &str) -> Option<String> {
    normalize_zip5(s).or_else(|| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
    })
}

/// In-memory postal code table.
#[derive(Debug, Clone, Default)]
pub struct GeoNamesLookup {
    places: HashMap<String, Place>,
}

impl GeoNamesLookup {
    /// Parses tab-separated GeoNames rows: country code, postal code, place
    /// name, admin name1, admin code1, ... The first row for a code wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut places = HashMap::new();
        for (lineno, row) in reader.records().enumerate() {
            let row = row?;
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            if row.len() <= ADMIN_CODE1 {
                return Err(IntakeError::ConfigError {
                    message: format!(
                        "GeoNames line {} has too few columns ({})",
                        lineno + 1,
                        row.len()
                    ),
                });
            }

            let place_name = row[PLACE_NAME].trim();
            let Some(key) = postal_key(&row[POSTAL_CODE]) else {
                continue;
            };
            if place_name.is_empty() {
                continue;
            }

            places.entry(key).or_insert_with(|| Place {
                place_name: place_name.to_string(),
                state_code: row[ADMIN_CODE1].trim().to_string(),
            });
        }

        tracing::info!("🗺️ Loaded {} postal codes", places.len());
        Ok(Self { places })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl PostalLookup for GeoNamesLookup {
    fn lookup(&self, postal_code: &str) -> Option<Place> {
        let key = postal_key(postal_code)?;
        self.places.get(&key).cloned()
    }
}

/// Used when no postal data is configured; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPostalLookup;

impl PostalLookup for NoPostalLookup {
    fn lookup(&self, _postal_code: &str) -> Option<Place> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "US\t53151\tNew Berlin\tWisconsin\tWI\tWaukesha\t133\t\t\t42.9764\t-88.1084\t4\n\
                          US\t53151\tDuplicate\tWisconsin\tWI\t\t\t\t\t0\t0\t4\n\
                          US\t02134\tAllston\tMassachusetts\tMA\tSuffolk\t025\t\t\t42.3539\t-71.1337\t4\n\
                          US\t99999\t\tNowhere\tNW\t\t\t\t\t0\t0\t1\n";

    #[test]
    fn test_normalize_zip5() {
        assert_eq!(normalize_zip5("53151"), Some("53151".to_string()));
        assert_eq!(normalize_zip5(" 53151-1234 "), Some("53151".to_string()));
        assert_eq!(normalize_zip5("5315"), None);
        assert_eq!(normalize_zip5("abc"), None);
    }

    #[test]
    fn test_lookup_hits_and_misses() {
        let lookup = GeoNamesLookup::from_bytes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(
            lookup.lookup("53151-0001"),
            Some(Place {
                place_name: "New Berlin".to_string(),
                state_code: "WI".to_string(),
            })
        );
        assert_eq!(lookup.lookup("02134").unwrap().place_name, "Allston");
        assert_eq!(lookup.lookup("99999"), None);
        assert_eq!(lookup.lookup("10001"), None);
        assert_eq!(lookup.lookup(""), None);
    }

    #[test]
    fn test_short_rows_are_rejected() {
        let err = GeoNamesLookup::from_bytes(b"US\t53151\tNew Berlin\n").unwrap_err();
        assert!(err.to_string().contains("too few columns"));
    }

    #[test]
    fn test_no_postal_lookup_always_misses() {
        assert_eq!(NoPostalLookup.lookup("53151"), None);
    }
}
