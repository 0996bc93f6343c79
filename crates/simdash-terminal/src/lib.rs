//! Terminal presentation for simdash
//!
//! [`FramePresenter`] receives views from the synchronizer and keeps them in
//! a [`DashboardFrame`]; the formatters in [`output`] turn a frame into text
//! charts and tables or JSON.

pub mod charts;
pub mod frame;
pub mod output;

pub use frame::{CostChart, DashboardFrame, ExecutionChart, FramePresenter, ResourceChart};
pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
