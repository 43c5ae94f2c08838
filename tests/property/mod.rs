//! Property-based tests for the resolution engine
