//! Per-record field normalization applied between column resolution and
//! submission.

use crate::domain::model::{CanonicalField, CanonicalRecord};
use crate::domain::ports::PostalLookup;

pub const PEDIATRICS_WEST: &str = "PEDIATRICS WEST";
pub const PAMELA_JOHNSON_PT: &str = "PAMELA JOHNSON PT";
pub const NEW_BERLIN_MEDICAL: &str = "New Berlin Medical Services LLC";
pub const PERSON_SURGICAL: &str = "PERSON SURGICAL ASSOCIATES";

/// Maps free-text practice names matching its keywords or abbreviations onto
/// one canonical practice name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeRule {
    pub canonical_name: &'static str,
    /// Matched anywhere in the cleaned name.
    pub keywords: &'static [&'static str],
    /// Matched against the whole cleaned name.
    pub abbreviations: &'static [&'static str],
}

impl PracticeRule {
    pub fn matches(&self, cleaned: &str) -> bool {
        self.keywords.iter().any(|keyword| cleaned.contains(keyword))
            || self.abbreviations.iter().any(|abbr| cleaned == *abbr)
    }
}

/// Evaluated top to bottom; the first match wins. "person surgical west"
/// resolves to PEDIATRICS WEST because of this order.
pub const PRACTICE_RULES: &[PracticeRule] = &[
    PracticeRule {
        canonical_name: PEDIATRICS_WEST,
        keywords: &["pedia", "west"],
        abbreviations: &["pw"],
    },
    PracticeRule {
        canonical_name: PAMELA_JOHNSON_PT,
        keywords: &["pamela", "johnson"],
        abbreviations: &[],
    },
    PracticeRule {
        canonical_name: NEW_BERLIN_MEDICAL,
        keywords: &["berlin"],
        abbreviations: &["nbms"],
    },
    PracticeRule {
        canonical_name: PERSON_SURGICAL,
        keywords: &["person", "surgical"],
        abbreviations: &["psa"],
    },
];

pub fn normalize_practice_name(raw: &str) -> String {
    normalize_practice_name_with(raw, PRACTICE_RULES)
}

/// Unmatched names are returned exactly as given.
pub fn normalize_practice_name_with(raw: &str, rules: &[PracticeRule]) -> String {
    let cleaned = raw.trim().to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&cleaned))
        .map(|rule| rule.canonical_name.to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn normalize_gender(raw: Option<&str>) -> &'static str {
    let Some(value) = raw else {
        return "Unknown";
    };
    let value = value.trim().to_lowercase();
    if value.starts_with('m') {
        "Male"
    } else if value.starts_with('f') {
        "Female"
    } else {
        "Unknown"
    }
}

/// Overwrites City and State from the postal lookup when the zip code
/// resolves. Returns whether the record was enriched.
pub fn enrich_location(record: &mut CanonicalRecord, lookup: &dyn PostalLookup) -> bool {
    let zip = record.get(CanonicalField::ZipCode).trim().to_string();
    if zip.is_empty() {
        return false;
    }

    match lookup.lookup(&zip) {
        Some(place) => {
            tracing::debug!(
                "Zip {} resolved to {}, {}",
                zip,
                place.place_name,
                place.state_code
            );
            record.set(CanonicalField::City, place.place_name);
            record.set(CanonicalField::State, place.state_code);
            true
        }
        None => {
            tracing::debug!("Zip {} not found, keeping City/State", zip);
            false
        }
    }
}

/// Applies every normalization step to `record` in place.
pub fn normalize_record(record: &mut CanonicalRecord, lookup: &dyn PostalLookup) {
    let practice = normalize_practice_name(record.get(CanonicalField::Practice));
    record.set(CanonicalField::Practice, practice);

    let gender = normalize_gender(Some(record.get(CanonicalField::Gender)));
    record.set(CanonicalField::Gender, gender);

    enrich_location(record, lookup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::Place;
    use std::collections::HashMap;

    struct FixedLookup(HashMap<&'static str, Place>);

    impl PostalLookup for FixedLookup {
        fn lookup(&self, postal_code: &str) -> Option<Place> {
            self.0.get(postal_code).cloned()
        }
    }

    fn waukesha() -> FixedLookup {
        let mut places = HashMap::new();
        places.insert(
            "53151",
            Place {
                place_name: "New Berlin".to_string(),
                state_code: "WI".to_string(),
            },
        );
        FixedLookup(places)
    }

    #[test]
    fn test_pediatrics_variants() {
        assert_eq!(normalize_practice_name("Peds West Clinic"), PEDIATRICS_WEST);
        assert_eq!(normalize_practice_name("PW"), PEDIATRICS_WEST);
        assert_eq!(normalize_practice_name("  pw  "), PEDIATRICS_WEST);
        assert_eq!(normalize_practice_name("Pediatric Associates"), PEDIATRICS_WEST);
    }

    #[test]
    fn test_other_practices() {
        assert_eq!(normalize_practice_name("Dr. Pamela"), PAMELA_JOHNSON_PT);
        assert_eq!(normalize_practice_name("johnson physical therapy"), PAMELA_JOHNSON_PT);
        assert_eq!(normalize_practice_name("NBMS"), NEW_BERLIN_MEDICAL);
        assert_eq!(normalize_practice_name("berlin med"), NEW_BERLIN_MEDICAL);
        assert_eq!(normalize_practice_name("PSA"), PERSON_SURGICAL);
        assert_eq!(normalize_practice_name("Surgical Group"), PERSON_SURGICAL);
    }

    #[test]
    fn test_rule_order_decides_ambiguous_names() {
        assert_eq!(normalize_practice_name("Person Surgical West"), PEDIATRICS_WEST);
        assert_eq!(normalize_practice_name("Johnson of Berlin"), PAMELA_JOHNSON_PT);
    }

    #[test]
    fn test_abbreviations_only_match_whole_name() {
        assert_eq!(normalize_practice_name("pwc"), "pwc");
        assert_eq!(normalize_practice_name("psa clinic"), "psa clinic");
    }

    #[test]
    fn test_unmatched_practice_passes_through_unchanged() {
        assert_eq!(normalize_practice_name(" Lakeside Family Care "), " Lakeside Family Care ");
        assert_eq!(normalize_practice_name(""), "");
    }

    #[test]
    fn test_practice_normalization_is_idempotent() {
        for name in ["Peds West Clinic", "pamela", "nbms", "psa", "Lakeside"] {
            let once = normalize_practice_name(name);
            assert_eq!(normalize_practice_name(&once), once);
        }
    }

    #[test]
    fn test_custom_rule_set() {
        let rules = [PracticeRule {
            canonical_name: "LAKESIDE FAMILY CARE",
            keywords: &["lakeside"],
            abbreviations: &["lfc"],
        }];
        assert_eq!(
            normalize_practice_name_with("LFC", &rules),
            "LAKESIDE FAMILY CARE"
        );
        assert_eq!(normalize_practice_name_with("PW", &rules), "PW");
    }

    #[test]
    fn test_gender() {
        assert_eq!(normalize_gender(Some("Male")), "Male");
        assert_eq!(normalize_gender(Some("f")), "Female");
        assert_eq!(normalize_gender(Some("FEMALE")), "Female");
        assert_eq!(normalize_gender(Some("  m ")), "Male");
        assert_eq!(normalize_gender(Some("X")), "Unknown");
        assert_eq!(normalize_gender(Some("")), "Unknown");
        assert_eq!(normalize_gender(None), "Unknown");
    }

    #[test]
    fn test_gender_is_idempotent() {
        for value in ["Male", "Female", "Unknown"] {
            assert_eq!(normalize_gender(Some(value)), value);
        }
    }

    #[test]
    fn test_enrichment_overwrites_city_and_state_on_match() {
        let mut record = CanonicalRecord::new()
            .with(CanonicalField::ZipCode, " 53151 ")
            .with(CanonicalField::City, "Milwaukee")
            .with(CanonicalField::State, "IL");

        assert!(enrich_location(&mut record, &waukesha()));
        assert_eq!(record.get(CanonicalField::City), "New Berlin");
        assert_eq!(record.get(CanonicalField::State), "WI");
        assert_eq!(record.get(CanonicalField::ZipCode), " 53151 ");
    }

    #[test]
    fn test_enrichment_keeps_city_and_state_without_match() {
        let mut record = CanonicalRecord::new()
            .with(CanonicalField::ZipCode, "99999")
            .with(CanonicalField::City, "Springfield")
            .with(CanonicalField::State, "IL");

        assert!(!enrich_location(&mut record, &waukesha()));
        assert_eq!(record.get(CanonicalField::City), "Springfield");
        assert_eq!(record.get(CanonicalField::State), "IL");
    }

    #[test]
    fn test_enrichment_skips_blank_zip() {
        let mut record = CanonicalRecord::new().with(CanonicalField::City, "Springfield");
        assert!(!enrich_location(&mut record, &waukesha()));
        assert_eq!(record.get(CanonicalField::City), "Springfield");
    }

    #[test]
    fn test_normalize_record_leaves_dob_untouched() {
        let mut record = CanonicalRecord::new()
            .with(CanonicalField::Practice, "peds west")
            .with(CanonicalField::Gender, "F")
            .with(CanonicalField::Dob, "02/29/2020")
            .with(CanonicalField::ZipCode, "53151");

        normalize_record(&mut record, &waukesha());
        let once = record.clone();
        normalize_record(&mut record, &waukesha());

        assert_eq!(record, once);
        assert_eq!(record.get(CanonicalField::Practice), PEDIATRICS_WEST);
        assert_eq!(record.get(CanonicalField::Gender), "Female");
        assert_eq!(record.get(CanonicalField::Dob), "02/29/2020");
        assert_eq!(record.get(CanonicalField::City), "New Berlin");
    }
}
