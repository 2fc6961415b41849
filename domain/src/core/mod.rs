//! Core helpers shared across all subdomains.

pub mod string;
