//! Unit and behaviour tests for the branching workflow.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod grammar_tests;
mod helpers;
mod registrar_tests;
