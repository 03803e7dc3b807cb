//! Pull request texts and branch names.
//!
//! Titles, bodies and commit messages are Handlebars templates configured per
//! language; see [`UpdateContext`] for the available variables.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer, UpdateContext};

use md5::{Digest, Md5};

/// Prefix of every update branch.
pub const BRANCH_PREFIX: &str = "greenkeep/";

/// Generates the branch name for `seed`.
///
/// Format: "greenkeep/{md5 hex of seed}"
#[must_use]
pub fn generate_branch_name(seed: &str) -> String {
    format!("{BRANCH_PREFIX}{:x}", Md5::digest(seed.as_bytes()))
}

/// Generates a branch name seeded with the current time.
#[must_use]
pub fn fresh_branch_name() -> String {
    generate_branch_name(&jiff::Timestamp::now().to_string())
}
