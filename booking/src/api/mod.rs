//! Hotel REST API adapter.
//!
//! [`HttpHotelApi`] implements every collaborator trait over HTTP;
//! [`mapping`] turns the API's loosely-shaped JSON into domain records.

pub mod client;
pub mod mapping;

pub use client::HttpHotelApi;
