//! A many-to-many shortest path engine for preprocessed road networks.
//!
//! Takes a road graph preprocessed either into a contraction hierarchy or into
//! a multi-level overlay and computes full travel time matrices between sets of
//! matched positions. The heavy lifting happens in [`algo::many_to_many`].

#[macro_use]
pub mod report;
pub mod algo;
pub mod cli;
pub mod datastr;
pub mod experiments;
pub mod util;

// Use of a mod or pub mod is not actually necessary.
pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
