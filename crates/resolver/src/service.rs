//! Taxonomy resolution service.
//!
//! The service is either *uninitialized* or *ready*. The first call to any
//! lookup loads the current version and its full tree and moves it to ready;
//! [`TaxonomyService::reset`] moves it back. The loaded tree and the id cache
//! filled from it live in one [`Arc`]ed snapshot, so a reset drops both
//! together and a cache entry can never outlive its tree.
//!
//! Initialization runs under an async mutex: concurrent first callers wait for
//! a single version/tree load instead of each performing their own.

use std::sync::Arc;

use serde::Deserialize;
use taxonomy::{
    EccairsAttribute, EccairsEntity, EccairsValue, Endpoints, IdCache, InternalId, NodeKind,
    TaxonomyCode, TaxonomyError, TaxonomyTransport, TaxonomyTree, TaxonomyVersionInfo, Timestamp,
    TreeNode, VersionId,
};
use tokio::sync::Mutex;

use crate::{RetrySettings, RetryingTransport, ValueListBuilder};

/// Everything loaded for one taxonomy version.
#[derive(Debug)]
struct Snapshot {
    version: TaxonomyVersionInfo,
    tree: TaxonomyTree,
    ids: IdCache,
    loaded_at: Timestamp,
}

impl Snapshot {
    fn resolve(&self, code: TaxonomyCode, kind: NodeKind) -> Result<TreeNode, TaxonomyError> {
        self.ids
            .get_or_resolve(code, kind, || self.tree.find(code, kind).cloned())
    }
}

#[derive(Debug)]
enum Lifecycle {
    Uninitialized,
    Ready(Arc<Snapshot>),
}

/// One attribute record of the batch lookup response.
#[derive(Debug, Deserialize)]
struct AttributeDetails {
    #[serde(default)]
    entity: Option<EntityRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRecord {
    id: InternalId,
    #[serde(rename = "tc")]
    taxonomy_code: TaxonomyCode,
    #[serde(default)]
    label: String,
    #[serde(default)]
    xsd_tag: Option<String>,
}

/// Read-through client for the ECCAIRS taxonomy service.
#[derive(Debug)]
pub struct TaxonomyService<T> {
    transport: RetryingTransport<T>,
    endpoints: Endpoints,
    state: Mutex<Lifecycle>,
}

impl<T: TaxonomyTransport> TaxonomyService<T> {
    /// Creates a service using the default retry budget (5 retries, 10 s apart).
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::ConfigurationError`] if `base_url` is blank.
    pub fn new(base_url: impl Into<String>, transport: T) -> Result<Self, TaxonomyError> {
        Self::with_retry_settings(base_url, transport, RetrySettings::default())
    }

    /// Creates a service with an explicit retry budget.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::ConfigurationError`] if `base_url` is blank.
    pub fn with_retry_settings(
        base_url: impl Into<String>,
        transport: T,
        retry: RetrySettings,
    ) -> Result<Self, TaxonomyError> {
        Ok(Self {
            transport: RetryingTransport::new(transport, retry),
            endpoints: Endpoints::new(base_url)?,
            state: Mutex::new(Lifecycle::Uninitialized),
        })
    }

    /// Returns `true` once the version and tree have been loaded.
    pub async fn is_initialized(&self) -> bool {
        matches!(*self.state.lock().await, Lifecycle::Ready(_))
    }

    /// When the current version and tree were loaded, if they have been.
    pub async fn loaded_at(&self) -> Option<Timestamp> {
        match &*self.state.lock().await {
            Lifecycle::Ready(snapshot) => Some(snapshot.loaded_at),
            Lifecycle::Uninitialized => None,
        }
    }

    /// Discards the loaded version, tree and id cache. The next lookup loads
    /// them again.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, Lifecycle::Ready(_)) {
            tracing::info!("Resetting taxonomy service");
        }
        *state = Lifecycle::Uninitialized;
    }

    /// Label of the current taxonomy version, e.g. `5.1.1.2`.
    ///
    /// # Errors
    ///
    /// Fails if the version or tree cannot be loaded.
    pub async fn taxonomy_version(&self) -> Result<String, TaxonomyError> {
        Ok(self.ready().await?.version.label.clone())
    }

    /// Internal id of the current taxonomy version.
    ///
    /// # Errors
    ///
    /// Fails if the version or tree cannot be loaded.
    pub async fn taxonomy_version_id(&self) -> Result<VersionId, TaxonomyError> {
        Ok(self.ready().await?.version.id)
    }

    /// Label and id of the current taxonomy version.
    ///
    /// # Errors
    ///
    /// Fails if the version or tree cannot be loaded.
    pub async fn version_info(&self) -> Result<TaxonomyVersionInfo, TaxonomyError> {
        Ok(self.ready().await?.version.clone())
    }

    /// Whether the attribute's value list has more than one level.
    ///
    /// Attributes without a value list report `false`.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::NotFound`] for unknown codes, or any transport failure.
    #[tracing::instrument(skip(self))]
    pub async fn has_hierarchical_value_list(
        &self,
        attribute: TaxonomyCode,
    ) -> Result<bool, TaxonomyError> {
        let snapshot = self.ready().await?;
        let node = snapshot.resolve(attribute, NodeKind::Attribute)?;
        let envelope = self
            .transport
            .fetch(
                &self.endpoints.attribute_by_id(node.id, snapshot.version.id),
                "attribute metadata",
            )
            .await?;
        match envelope.extract_optional::<i64>("/attributeValueList/levels")? {
            Some(levels) => Ok(levels > 1),
            None => {
                tracing::trace!(%attribute, "Attribute does not have a value list");
                Ok(false)
            }
        }
    }

    /// The attribute's value list, nested for hierarchical lists.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::NotFound`] for unknown codes, or any transport failure.
    #[tracing::instrument(skip(self))]
    pub async fn value_list(
        &self,
        attribute: TaxonomyCode,
    ) -> Result<Vec<EccairsValue>, TaxonomyError> {
        tracing::trace!(%attribute, "Loading value list");
        let snapshot = self.ready().await?;
        let node = snapshot.resolve(attribute, NodeKind::Attribute)?;
        ValueListBuilder::new(&self.transport, &self.endpoints)
            .build(node.id)
            .await
    }

    /// The entity that owns the attribute.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::NotFound`] for unknown codes,
    /// [`TaxonomyError::MalformedResponse`] if the service does not return
    /// exactly one attribute with an entity, or any transport failure.
    #[tracing::instrument(skip(self))]
    pub async fn parent_entity(
        &self,
        attribute: TaxonomyCode,
    ) -> Result<EccairsEntity, TaxonomyError> {
        let snapshot = self.ready().await?;
        let node = snapshot.resolve(attribute, NodeKind::Attribute)?;
        let envelope = self
            .transport
            .fetch(
                &self.endpoints.attributes_by_ids(&[node.id], snapshot.version.id),
                "attributes by ids",
            )
            .await?;

        let mut records: Vec<AttributeDetails> = envelope.extract("")?;
        if records.len() != 1 {
            return Err(TaxonomyError::malformed(
                envelope.context(),
                format!("expected one attribute record, found {}", records.len()),
            ));
        }
        let entity = records
            .pop()
            .and_then(|record| record.entity)
            .ok_or_else(|| TaxonomyError::malformed(envelope.context(), "attribute has no entity"))?;

        Ok(EccairsEntity {
            id: entity.id,
            taxonomy_code: entity.taxonomy_code,
            label: entity.label,
            xsd_tag: entity.xsd_tag,
        })
    }

    /// The entity with the given taxonomy code.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::NotFound`] for unknown codes, or any failure loading the tree.
    pub async fn entity(&self, code: TaxonomyCode) -> Result<EccairsEntity, TaxonomyError> {
        let snapshot = self.ready().await?;
        Ok(snapshot.resolve(code, NodeKind::Entity)?.to_entity())
    }

    /// The attribute with the given taxonomy code.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::NotFound`] for unknown codes, or any failure loading the tree.
    pub async fn attribute(&self, code: TaxonomyCode) -> Result<EccairsAttribute, TaxonomyError> {
        let snapshot = self.ready().await?;
        Ok(snapshot.resolve(code, NodeKind::Attribute)?.to_attribute())
    }

    async fn ready(&self) -> Result<Arc<Snapshot>, TaxonomyError> {
        let mut state = self.state.lock().await;
        if let Lifecycle::Ready(snapshot) = &*state {
            return Ok(Arc::clone(snapshot));
        }
        let snapshot = Arc::new(self.load().await?);
        *state = Lifecycle::Ready(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.endpoints.base_url()))]
    async fn load(&self) -> Result<Snapshot, TaxonomyError> {
        let envelope = self.transport.fetch(&self.endpoints.version(), "version").await?;
        let version = TaxonomyVersionInfo {
            label: envelope.extract("/version")?,
            id: envelope.extract("/id")?,
        };

        let envelope = self.transport.fetch(&self.endpoints.tree(), "tree").await?;
        let tree = TaxonomyTree::from_document(&envelope.data);
        tracing::info!(
            version = %version.label,
            version_id = %version.id,
            nodes = tree.len(),
            "Loaded taxonomy"
        );

        Ok(Snapshot {
            version,
            tree,
            ids: IdCache::new(),
            loaded_at: Timestamp::now(),
        })
    }
}
