use crate::core::normalize::normalize_record;
use crate::core::submission::submit;
use crate::domain::model::{CanonicalRecord, OutputRecord};
use crate::domain::payload::RequestHeader;
use crate::domain::ports::{PatientService, PostalLookup};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outputs(outputs: &[OutputRecord]) -> Self {
        let succeeded = outputs.iter().filter(|output| output.is_success()).count();
        Self {
            total: outputs.len(),
            succeeded,
            failed: outputs.len() - succeeded,
        }
    }
}

/// Runs normalize-then-submit over a batch, one record at a time, against a
/// service handle and header that were set up once for the whole batch.
pub struct BatchProcessor<'a> {
    service: &'a dyn PatientService,
    header: &'a RequestHeader,
    lookup: &'a dyn PostalLookup,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        service: &'a dyn PatientService,
        header: &'a RequestHeader,
        lookup: &'a dyn PostalLookup,
    ) -> Self {
        Self {
            service,
            header,
            lookup,
        }
    }

    pub async fn process_record(&self, mut record: CanonicalRecord) -> OutputRecord {
        normalize_record(&mut record, self.lookup);
        let result = submit(self.service, self.header, &record).await;
        OutputRecord::new(record, result)
    }

    /// Output row `i` always belongs to input row `i`.
    pub async fn run(&self, records: Vec<CanonicalRecord>) -> Vec<OutputRecord> {
        let total = records.len();
        tracing::info!("📤 Submitting {} patient records", total);

        let mut outputs = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            let output = self.process_record(record).await;
            if output.is_success() {
                tracing::info!(
                    "✅ Row {}/{}: created patient {}",
                    index + 1,
                    total,
                    output.patient_id
                );
            } else {
                tracing::warn!("❌ Row {}/{}: {}", index + 1, total, output.status);
            }
            outputs.push(output);
        }

        let summary = BatchSummary::from_outputs(&outputs);
        tracing::info!(
            "📊 Batch complete: {} succeeded, {} failed, {} total",
            summary.succeeded,
            summary.failed,
            summary.total
        );
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::PEDIATRICS_WEST;
    use crate::core::testing::{header, record, RecordingService};
    use crate::domain::model::CanonicalField;
    use crate::domain::payload::{Place, ServiceError};

    struct NoMatch;

    impl PostalLookup for NoMatch {
        fn lookup(&self, _postal_code: &str) -> Option<Place> {
            None
        }
    }

    #[tokio::test]
    async fn test_fault_on_one_record_is_isolated() {
        let service = RecordingService::new()
            .fail_for("Bob", ServiceError::Fault("Server was unable to process request".to_string()));
        let header = header();
        let processor = BatchProcessor::new(&service, &header, &NoMatch);

        let outputs = processor
            .run(vec![
                record("Ada", "1/1/1990"),
                record("Bob", "2/2/1980"),
                record("Cy", "3/3/1970"),
            ])
            .await;

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].status, "Success");
        assert_eq!(
            outputs[1].status,
            "SOAP Fault: Server was unable to process request"
        );
        assert_eq!(outputs[1].patient_id, "N/A");
        assert_eq!(outputs[1].case_id, "N/A");
        assert_eq!(outputs[2].status, "Success");
        assert_eq!(service.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_output_order_matches_input_order() {
        let service = RecordingService::new();
        let header = header();
        let processor = BatchProcessor::new(&service, &header, &NoMatch);

        let names = ["Ada", "Bob", "Cy", "Dee", "Eve"];
        let records = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Every other row has a DOB that never reaches the service.
                let dob = if i % 2 == 0 { "1/1/1990" } else { "" };
                record(name, dob)
            })
            .collect();

        let outputs = processor.run(records).await;

        assert_eq!(outputs.len(), names.len());
        for (output, name) in outputs.iter().zip(names) {
            assert_eq!(output.record.get(CanonicalField::FirstName), name);
        }
        assert_eq!(outputs[1].status, "DOB field is missing or empty");
        assert_eq!(service.calls().len(), 3);
        assert_eq!(outputs[4].patient_id, "1002");
    }

    #[tokio::test]
    async fn test_outputs_carry_normalized_values() {
        let service = RecordingService::new();
        let header = header();
        let processor = BatchProcessor::new(&service, &header, &NoMatch);

        let raw = record("Ada", "1/1/1990")
            .with(CanonicalField::Practice, "Peds West Clinic")
            .with(CanonicalField::Gender, "f");

        let output = processor.process_record(raw).await;

        assert_eq!(output.record.get(CanonicalField::Practice), PEDIATRICS_WEST);
        assert_eq!(output.record.get(CanonicalField::Gender), "Female");
        assert_eq!(service.calls()[0].practice_name, PEDIATRICS_WEST);
        assert_eq!(service.calls()[0].gender, "Female");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let service = RecordingService::new();
        let header = header();
        let processor = BatchProcessor::new(&service, &header, &NoMatch);

        assert!(processor.run(Vec::new()).await.is_empty());
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let outputs = vec![
            OutputRecord::new(
                record("Ada", "1/1/1990"),
                crate::domain::model::SubmissionResult::success("1", vec![]),
            ),
            OutputRecord::new(
                record("Bob", ""),
                crate::domain::model::SubmissionResult::error("DOB field is missing or empty"),
            ),
        ];
        assert_eq!(
            BatchSummary::from_outputs(&outputs),
            BatchSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
    }
}
