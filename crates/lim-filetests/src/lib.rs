//! File-based tests for the IR and its passes.
//!
//! Test files under `filetests/` contain:
//! - A test command (`test domtree`, `test loops`, `test licm`,
//!   `test verifier`)
//! - Functions to run the corresponding computation on
//! - Expected output as `;` comments holding filecheck directives

pub mod filecheck;
pub mod parser;

#[cfg(test)]
mod test_domtree;
#[cfg(test)]
mod test_licm;
#[cfg(test)]
mod test_loops;
#[cfg(test)]
mod test_verifier;

pub use self::filecheck::match_filecheck;
pub use self::parser::{parse_test_file, TestCase};
