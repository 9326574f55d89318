//! Property-based tests for result assembly.
