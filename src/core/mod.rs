pub mod batch;
pub mod columns;
pub mod dates;
pub mod etl;
pub mod normalize;
pub mod pipeline;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
