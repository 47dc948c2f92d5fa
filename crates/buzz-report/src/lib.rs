//! Aggregation and Markdown reporting over ingested posts.

pub mod accounts;
pub mod correlation;
pub mod error;
pub mod evolution;
pub mod group;
pub mod markdown;
pub mod output;
pub mod stats;

pub use accounts::{account_summaries, AccountSummary};
pub use correlation::{format_correlation, strategy_correlations, StrategyCorrelation};
pub use error::ReportError;
pub use evolution::{
    prepend_evolution_entry, render_evolution_entry, EVOLUTION_FILE_NAME, EVOLUTION_HEADER,
};
pub use group::{group_by, Dimension, GroupStats, TimeSlot, UnknownDimension, UNKNOWN_ACCOUNT};
pub use markdown::{render_analysis_report, weighted_engagement, ReportOptions};
pub use output::{report_file_name, write_report};
pub use stats::{mean, median, pearson};
