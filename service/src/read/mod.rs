//! Read entities definitions.

pub mod product_request;
