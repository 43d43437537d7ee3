//! Hiring funnel analysis: turns a job-application tracker export into a
//! weighted stage-transition graph and renders it as SankeyMatic markup or a
//! Sankey diagram.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
