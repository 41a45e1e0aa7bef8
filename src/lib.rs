//! PEPM Analytics - cost metrics and interactive analysis for self-funded health plans
//!
//! This library provides:
//! - Per-employee-per-month (PEPM) cost, variance against target, and savings trend
//! - What-if modeling of headcount adjustments and rebate timing shifts
//! - Weighted multi-dimensional peer similarity ranking with cohort statistics
//! - A hierarchical, sortable, virtually-scrolled reporting grid model
//! - Timing and caching seams, configuration, and CSV ingestion around the engines

pub mod calculation;
pub mod whatif;
pub mod peers;
pub mod grid;
pub mod instrument;
pub mod service;
pub mod loader;
pub mod config;
pub mod format;
pub mod error;

// Re-export commonly used types
pub use calculation::{calculate_pepm, calculate_variance, PepmInput, PepmResult, VarianceResult};
pub use whatif::{project, WhatIfScenario, WhatIfSession};
pub use peers::{rank, PeerOrganization, ReferenceOrganization, DimensionSet};
pub use grid::{build_rows, GridModel, GridRow, PeriodRecord};
pub use service::AnalyticsService;
pub use config::AnalyticsConfig;
pub use error::{CalcError, GridError, LoadError};
