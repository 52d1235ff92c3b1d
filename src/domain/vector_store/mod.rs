//! Vector store domain - OpenSearch Serverless collections and indexes

mod entity;
mod traits;

pub use entity::{
    collection_status, data_access_policy, encryption_policy, network_policy,
    vector_index_definition, AccessPolicySummary, CollectionEndpoint, CollectionSummary,
    IndexCreation, SecurityPolicyKind,
};
pub use traits::{CollectionAdmin, VectorIndexApi};

#[cfg(test)]
pub use traits::{MockCollectionAdmin, MockVectorIndexApi};
