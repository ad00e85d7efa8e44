//! Data service infrastructure - HTTP transport and the PostgREST client

mod http_client;
mod postgrest;

pub use http_client::{HttpClient, HttpClientTrait};
pub use postgrest::{rows_from_value, PostgrestClient};

#[cfg(test)]
pub use http_client::mock::{MockHttpClient, RecordedRequest};
