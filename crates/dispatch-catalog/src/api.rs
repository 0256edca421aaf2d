//! The declarative storage/catalog interface: every method has a default
//! body returning [`CatalogError::NotImplemented`]. This crate carries no
//! query, filter, or persistence logic -- it exists purely as the typed
//! seam an integrator implements against.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Delta, Namespace, PartitionMeta, StreamMeta, TableMeta, TableVersion};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} is not implemented by this catalog")]
    NotImplemented(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
}

/// The full declarative catalog surface. Every method defaults to
/// `NotImplemented`; a concrete catalog overrides only the methods it
/// actually backs.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, CatalogError> {
        Err(CatalogError::NotImplemented("list_namespaces"))
    }

    async fn list_tables(&self, _namespace: &str) -> Result<Vec<TableMeta>, CatalogError> {
        Err(CatalogError::NotImplemented("list_tables"))
    }

    async fn list_table_versions(
        &self,
        _namespace: &str,
        _table: &str,
    ) -> Result<Vec<TableVersion>, CatalogError> {
        Err(CatalogError::NotImplemented("list_table_versions"))
    }

    async fn list_partitions(&self, _stream_id: &str) -> Result<Vec<PartitionMeta>, CatalogError> {
        Err(CatalogError::NotImplemented("list_partitions"))
    }

    async fn list_partitions_pending_commit(
        &self,
        _stream_id: &str,
    ) -> Result<Vec<PartitionMeta>, CatalogError> {
        Err(CatalogError::NotImplemented("list_partitions_pending_commit"))
    }

    async fn list_deltas(&self, _partition_id: &str) -> Result<Vec<Delta>, CatalogError> {
        Err(CatalogError::NotImplemented("list_deltas"))
    }

    async fn list_deltas_pending_commit(
        &self,
        _partition_id: &str,
    ) -> Result<Vec<Delta>, CatalogError> {
        Err(CatalogError::NotImplemented("list_deltas_pending_commit"))
    }

    async fn get_delta(&self, _delta_id: &str) -> Result<Delta, CatalogError> {
        Err(CatalogError::NotImplemented("get_delta"))
    }

    async fn get_latest_delta(&self, _partition_id: &str) -> Result<Delta, CatalogError> {
        Err(CatalogError::NotImplemented("get_latest_delta"))
    }

    async fn download_delta(&self, _delta_id: &str) -> Result<Vec<u8>, CatalogError> {
        Err(CatalogError::NotImplemented("download_delta"))
    }

    async fn download_delta_manifest_entry(
        &self,
        _delta_id: &str,
        _entry_index: usize,
    ) -> Result<Vec<u8>, CatalogError> {
        Err(CatalogError::NotImplemented("download_delta_manifest_entry"))
    }

    async fn get_delta_manifest(&self, _delta_id: &str) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::NotImplemented("get_delta_manifest"))
    }

    async fn create_namespace(&self, _name: &str) -> Result<Namespace, CatalogError> {
        Err(CatalogError::NotImplemented("create_namespace"))
    }

    async fn update_namespace(&self, _name: &str) -> Result<Namespace, CatalogError> {
        Err(CatalogError::NotImplemented("update_namespace"))
    }

    async fn create_table_version(
        &self,
        _namespace: &str,
        _table: &str,
    ) -> Result<TableVersion, CatalogError> {
        Err(CatalogError::NotImplemented("create_table_version"))
    }

    async fn update_table(&self, _namespace: &str, _table: &str) -> Result<TableMeta, CatalogError> {
        Err(CatalogError::NotImplemented("update_table"))
    }

    async fn update_table_version(
        &self,
        _table_id: &str,
        _version: u32,
    ) -> Result<TableVersion, CatalogError> {
        Err(CatalogError::NotImplemented("update_table_version"))
    }

    async fn stage_stream(&self, _table_id: &str, _version: u32) -> Result<StreamMeta, CatalogError> {
        Err(CatalogError::NotImplemented("stage_stream"))
    }

    async fn commit_stream(&self, _stream_id: &str) -> Result<StreamMeta, CatalogError> {
        Err(CatalogError::NotImplemented("commit_stream"))
    }

    async fn delete_stream(&self, _stream_id: &str) -> Result<(), CatalogError> {
        Err(CatalogError::NotImplemented("delete_stream"))
    }

    async fn get_partition_staging_area(
        &self,
        _stream_id: &str,
    ) -> Result<Vec<PartitionMeta>, CatalogError> {
        Err(CatalogError::NotImplemented("get_partition_staging_area"))
    }

    async fn stage_partition(
        &self,
        _stream_id: &str,
        _values: Vec<String>,
    ) -> Result<PartitionMeta, CatalogError> {
        Err(CatalogError::NotImplemented("stage_partition"))
    }

    async fn commit_partition(&self, _partition_id: &str) -> Result<PartitionMeta, CatalogError> {
        Err(CatalogError::NotImplemented("commit_partition"))
    }

    async fn delete_partition(&self, _partition_id: &str) -> Result<(), CatalogError> {
        Err(CatalogError::NotImplemented("delete_partition"))
    }

    async fn get_delta_staging_area(&self, _partition_id: &str) -> Result<Vec<Delta>, CatalogError> {
        Err(CatalogError::NotImplemented("get_delta_staging_area"))
    }

    async fn stage_delta(&self, _partition_id: &str) -> Result<Delta, CatalogError> {
        Err(CatalogError::NotImplemented("stage_delta"))
    }

    async fn commit_delta(&self, _delta_id: &str) -> Result<Delta, CatalogError> {
        Err(CatalogError::NotImplemented("commit_delta"))
    }

    async fn get_namespace(&self, _name: &str) -> Result<Namespace, CatalogError> {
        Err(CatalogError::NotImplemented("get_namespace"))
    }

    async fn namespace_exists(&self, _name: &str) -> Result<bool, CatalogError> {
        Err(CatalogError::NotImplemented("namespace_exists"))
    }

    async fn get_table(&self, _namespace: &str, _table: &str) -> Result<TableMeta, CatalogError> {
        Err(CatalogError::NotImplemented("get_table"))
    }

    async fn table_exists(&self, _namespace: &str, _table: &str) -> Result<bool, CatalogError> {
        Err(CatalogError::NotImplemented("table_exists"))
    }

    async fn get_table_version(
        &self,
        _table_id: &str,
        _version: u32,
    ) -> Result<TableVersion, CatalogError> {
        Err(CatalogError::NotImplemented("get_table_version"))
    }

    async fn get_latest_table_version(&self, _table_id: &str) -> Result<TableVersion, CatalogError> {
        Err(CatalogError::NotImplemented("get_latest_table_version"))
    }

    async fn get_latest_active_table_version(
        &self,
        _table_id: &str,
    ) -> Result<TableVersion, CatalogError> {
        Err(CatalogError::NotImplemented("get_latest_active_table_version"))
    }

    async fn get_table_version_column_names(
        &self,
        _table_id: &str,
        _version: u32,
    ) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::NotImplemented("get_table_version_column_names"))
    }

    async fn get_table_version_schema(
        &self,
        _table_id: &str,
        _version: u32,
    ) -> Result<serde_json::Value, CatalogError> {
        Err(CatalogError::NotImplemented("get_table_version_schema"))
    }

    async fn table_version_exists(&self, _table_id: &str, _version: u32) -> Result<bool, CatalogError> {
        Err(CatalogError::NotImplemented("table_version_exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyCatalog;
    impl CatalogApi for EmptyCatalog {}

    #[tokio::test]
    async fn default_methods_report_not_implemented() {
        let catalog = EmptyCatalog;
        let err = catalog.list_namespaces().await.unwrap_err();
        assert!(matches!(err, CatalogError::NotImplemented("list_namespaces")));
        let err = catalog.table_version_exists("t", 1).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotImplemented("table_version_exists")
        ));
    }
}
