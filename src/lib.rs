//! Layout Patcher: one-shot regex patch for the admin layout
//!
//! Swaps the order notification click handler in `AdminLayout.jsx` for a
//! version that routes to the order detail page.
//!
//! # Architecture
//!
//! A [`ReplacementPattern`] (lazy, dot-matches-newline regex plus a literal
//! replacement block) yields match spans. Each span becomes an [`Edit`], the
//! edits are spliced bottom-to-top, and the file is overwritten in place
//! (through symlinks, keeping its owner and mode). Nothing is kept between
//! runs.
//!
//! # Guarantees
//!
//! - Strict UTF-8 decoding; invalid files are rejected, never rewritten
//! - Zero matches is reported as [`PatchOutcome::NoMatch`], the file is untouched
//! - A file that already holds the replacement block is left as is
//! - Content outside the matched spans is preserved byte for byte
//!
//! # Example
//!
//! ```no_run
//! use layout_patcher::{notification, patch_file};
//!
//! let patch = notification::click_handler_patch().expect("built-in pattern compiles");
//! match patch_file("Frontend/src/modules/admin/layout/AdminLayout.jsx", &patch) {
//!     Ok(outcome) => println!("{outcome}"),
//!     Err(e) => eprintln!("Patch failed: {e}"),
//! }
//! ```

pub mod edit;
pub mod logging;
pub mod notification;
pub mod patcher;
pub mod pattern;

// Re-exports
pub use edit::{Edit, EditError};
pub use patcher::{check_file, patch_file, PatchError, PatchOutcome, PatchReport, Patcher};
pub use pattern::{PatternError, PatternMatch, ReplacePolicy, ReplacementPattern};
