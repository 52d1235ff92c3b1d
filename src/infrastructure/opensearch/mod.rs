//! OpenSearch Serverless - collection management and the signed index endpoint

mod index_client;
mod serverless_client;

pub use index_client::SignedIndexClient;
pub use serverless_client::OpenSearchServerlessClient;
