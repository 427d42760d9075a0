//! Pipeline orchestration.
//!
//! Runs the stages in a fixed order:
//!
//! 1. **Loading**: read the delimited file and infer column kinds
//! 2. **Cleaning**: profile and treat missing values
//! 3. **Summarizing**: statistics, correlations and insights
//! 4. **Visualizing**: render the chart catalogue as SVG
//! 5. **Reporting**: write the markdown report (and optionally JSON)

mod builder;
pub mod progress;

pub use builder::{AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder};
pub use progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
