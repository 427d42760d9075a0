//! Report generation module.
//!
//! The [`ReportGenerator`] turns the outputs of the earlier stages into a
//! [`Report`], which can be:
//! - rendered to the markdown file `data_analysis_report.md`
//! - written as JSON next to it (`--emit-report`)
//! - printed as JSON to stdout (`--json`)
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_report::reporting::{ReportGenerator, ReportInputs, ReportSettings};
//!
//! let generator = ReportGenerator::new(ReportSettings::from_config(&config));
//! let report = generator.build(&ReportInputs {
//!     source: &path,
//!     missing: &cleaning.missing,
//!     strategy: cleaning.strategy,
//!     cleaning_actions: &cleaning.actions,
//!     summary: &summary,
//!     insights: &insights,
//!     charts: &charts,
//! });
//! generator.write(&report)?;
//! ```

mod generator;

pub use generator::{Report, ReportGenerator, ReportInputs, ReportSection, ReportSettings};
