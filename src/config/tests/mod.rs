//! Unit tests for configuration loading and conversion.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence and CLI/environment loading tests
//! - `operation_mode`: Operation mode determination tests
//! - `field_resolution`: Token, credential and parameter conversion tests
//! - `validation`: Configuration consistency validation tests

mod field_resolution;
mod helpers;
