//! Page handler module
//!
//! Serves the three embedded dashboard pages; everything else under the
//! non-API namespace is a 404.

pub mod pages;

pub use pages::handle_page_request;
