#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for SDK services running on a DC/OS cluster.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by resource
//! - `client/`: query engine (trust, credentials, endpoints, classification)
//! - `output/`: plan and pod trees plus JSON formatting
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub mod client;
pub(crate) mod commands;
pub mod output;

pub use cli::run;
