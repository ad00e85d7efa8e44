//! Data service client trait definition

use async_trait::async_trait;
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use super::{ColumnFilter, DataRequest, ProcedureCall, TableSelect};
use crate::domain::DomainError;

/// Client for the hosted relational data service
///
/// Implementations return raw JSON rows. An empty result is an empty `Vec`,
/// never an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataServiceClient: Send + Sync {
    /// Invoke a remote procedure
    async fn call_procedure(&self, call: &ProcedureCall) -> Result<Vec<Value>, DomainError>;

    /// Read rows from a table
    async fn select(&self, select: &TableSelect) -> Result<Vec<Value>, DomainError>;

    /// Patch the rows matching `filters`, returning the updated rows
    async fn update(
        &self,
        table: &str,
        filters: &[ColumnFilter],
        patch: &Value,
    ) -> Result<Vec<Value>, DomainError>;
}

/// Run a read request against a client
pub async fn execute(
    client: &dyn DataServiceClient,
    request: &DataRequest,
) -> Result<Vec<Value>, DomainError> {
    match request {
        DataRequest::Procedure(call) => client.call_procedure(call).await,
        DataRequest::Select(select) => client.select(select).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_dispatches_procedure() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .withf(|call| call.name() == "get_niche_statistics")
            .times(1)
            .returning(|_| Ok(vec![serde_json::json!({"niche": "tech"})]));
        client.expect_select().never();

        let request: DataRequest = ProcedureCall::new("get_niche_statistics").into();
        let rows = execute(&client, &request).await.unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_dispatches_select() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_select()
            .withf(|select| select.table == "posts")
            .times(1)
            .returning(|_| Ok(vec![]));
        client.expect_call_procedure().never();

        let request: DataRequest = TableSelect::new("posts").into();
        let rows = execute(&client, &request).await.unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_execute_propagates_error() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .returning(|call| Err(DomainError::remote(call.name(), "HTTP 500")));

        let request: DataRequest = ProcedureCall::new("check_embeddings_stats").into();
        let result = execute(&client, &request).await;

        assert_eq!(
            result.unwrap_err(),
            DomainError::remote("check_embeddings_stats", "HTTP 500")
        );
    }
}
