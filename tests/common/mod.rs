//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - PDF fixtures built with printpdf
//! - In-memory page builders
//! - PDF inspection helpers and assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod pages;
pub mod pdf_helpers;

pub use assertions::*;
pub use fixtures::*;
pub use pages::*;
pub use pdf_helpers::*;
