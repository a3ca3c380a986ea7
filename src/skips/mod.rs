//! Test selection from the files changed against a target branch.

mod diff;
mod selector;
#[cfg(test)]
pub(crate) mod testing;

pub use diff::changed_files;
pub use selector::{RequiredTests, TestSelector};
