use crate::core::batch::BatchSummary;
use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order and returns the primary
    /// output path. Any phase error aborts the run before output is written.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting patient intake");

        let records = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", records.len());

        let outputs = self.pipeline.transform(records).await?;
        let summary = BatchSummary::from_outputs(&outputs);
        tracing::info!(
            "🔄 Processed {} records ({} succeeded, {} failed)",
            summary.total,
            summary.succeeded,
            summary.failed
        );

        let output_path = self.pipeline.load(outputs).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
