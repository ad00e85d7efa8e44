//! Data service domain - remote procedure and table access contracts

mod client;
mod request;
mod vector;

pub use client::{execute, DataServiceClient};
pub use request::{ColumnFilter, DataRequest, FilterOp, Order, ProcedureCall, TableSelect};
pub use vector::encode_vector;

#[cfg(test)]
pub use client::MockDataServiceClient;
