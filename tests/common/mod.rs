//! Common test infrastructure
//!
//! Every test gets its own [`TestWorkspace`], a temporary directory that
//! holds annotation tables, label tables and spectrogram images.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestWorkspace, QUADRANT_ANNOTATIONS};
//!
//! #[test]
//! fn test_derive() {
//!     let workspace = TestWorkspace::new();
//!     let annotations = workspace.write_file("annotations.csv", QUADRANT_ANNOTATIONS);
//!     // ...
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{image_value, interleaved_mood, TestWorkspace};
