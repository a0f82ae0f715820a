//! Integration tests for condify.
//!
//! Following the single-integration-test pattern from:
//! <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

pub(crate) mod common;

mod build;
mod help;
mod install_requirements;
mod select;
mod translate;
mod verbosity;
