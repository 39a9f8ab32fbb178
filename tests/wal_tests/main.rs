//! Operation log tests

mod recovery_tests;
