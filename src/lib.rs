//! Cardio Insights - Heart Disease Dataset Analysis Engine
//!
//! Loads the UCI heart disease CSV, cleans and derives analytic fields from
//! it, and computes the aggregate statistics a dashboard front end renders.
//! The front end itself (layout, charts, access gate) lives outside this
//! crate; the bundled binary is a thin console consumer of the same
//! interface.

pub mod config;
pub mod data;
pub mod stats;
