// HTTP request wrapper
// Token attachment, JSON/text response parsing and error normalization

pub mod client;
pub mod request;
pub mod response;

pub use client::{HttpClient, REQUEST_ID_HEADER};
pub use request::{query_pairs, RequestOptions, TimeoutSetting};
pub use response::{ApiResponse, ResponseBody};

#[cfg(test)]
mod tests;
