//! gradekey - deterministic activation codes bound to a device and a grade
//!
//! An activation code is derived from a device identifier and the grade
//! (tier) the customer purchased:
//!
//! ```text
//! CODE-<GRADE>-<first 10 hex chars of SHA-256("device_id:grade")>
//! ```
//!
//! The same inputs always give the same code, so nothing needs to be stored
//! to re-issue or check one.
//!
//! # Features
//!
//! - `clipboard` - System clipboard support via `arboard`. Enabled by default.
//!
//! # Example
//!
//! ```rust,ignore
//! use gradekey::deriver::derive_code;
//!
//! let code = derive_code("TEST-DEVICE", "basic").await?;
//! assert_eq!(code.as_str(), "CODE-BASIC-081DF5E684");
//! ```

// Core modules
pub mod activation_code;
pub mod deriver;
pub mod digest;
pub mod errors;

// Operator tooling
pub mod clipboard;
pub mod config;
pub mod generator;
pub mod grades;
pub mod logging;

pub use activation_code::ActivationCode;
pub use deriver::{derive_code, CodeDeriver};
pub use errors::{DerivationError, GradekeyError, GradekeyResult};
