//! Common utilities for the Wallaby HTML toolkit.
//!
//! This crate provides shared infrastructure used by the parser and query
//! components:
//! - **Fetching** - blocking HTTP GET and `data:` URL decoding
//! - **Recoding** - character-set conversion for parsed text
//! - **Warning System** - deduplicated colored terminal output

pub mod fetch;
pub mod recode;
pub mod warning;
