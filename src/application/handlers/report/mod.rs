//! Report handlers - synthesis, narrative and retrieval.

mod generate_report;
mod get_report;
mod narrative_generator;

pub use generate_report::{GenerateReportCommand, GenerateReportHandler};
pub use get_report::{GetReportHandler, GetReportQuery};
pub use narrative_generator::NarrativeGenerator;
