//! This module provides reusable test utilities:
//! - Mock PAPI server
//! - Test configuration builders
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_papi;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_papi::MockPapiServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
