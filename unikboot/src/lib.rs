#![doc = include_str!("../../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(unreachable_pub)]

extern crate serde_json;

#[cfg(doctest)]
mod doctests {
    doc_comment::doctest!("../../README.md");
}

pub mod builder;
pub mod executor;
pub mod image;
pub mod rump;
pub mod runner;
