//! The analysis page: state machine plus the loop that feeds it.

pub mod controller;
pub mod runtime;

pub use controller::{AnalysisPageController, LoadedAnalysis, PageState};
pub use runtime::{PageEvent, PageRuntime};
