//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token fallback and one-shot comment fields
//! - `settings`: Conversion into validated publish settings
//! - `cli_loading`: Parsing real command lines

mod helpers;
