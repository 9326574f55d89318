//! Property-based tests for the criteria model.
