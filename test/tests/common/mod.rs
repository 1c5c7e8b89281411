mod genesis_tests;
mod serde_utils_tests;
