//! URL handling module for Sitesnap
//!
//! This module provides href normalization, the crawl's link filter and
//! the domain key used to group output files.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::domain_key;
pub use filter::{filter_links, LinkFilter};
pub use normalize::{origin_of, path_extension, resolve_root_relative, strip_fragment};
