//! Data-access layer seam: the model trait the CRUD handlers call into, and the
//! registry of models known to the host application.

use crate::error::DataError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Structured where-clause. An empty map matches everything.
pub type Filter = Map<String, Value>;

/// Paging and ordering options accepted by every read or write call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl QueryOptions {
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.limit.is_none() && self.sort.is_none() && self.page.is_none()
    }
}

/// A record managed by a data-access layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: Value,
    pub attributes: Map<String, Value>,
    /// Per-source identities; internal to the data layer, never serialized.
    pub id_hash: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(id: Value, attributes: Map<String, Value>) -> Self {
        Self {
            id,
            attributes,
            id_hash: BTreeMap::new(),
        }
    }

    /// Overwrite every attribute, keeping the identity.
    pub fn replace_attributes(&mut self, attributes: Map<String, Value>) {
        self.attributes = attributes;
        self.attributes.remove("id");
    }

    /// JSON shape sent to clients: attributes with `id` merged in.
    pub fn to_json(&self) -> Value {
        let mut out = self.attributes.clone();
        out.insert("id".into(), self.id.clone());
        Value::Object(out)
    }
}

/// CRUD primitives of one model. Singular calls act on the first match only.
#[async_trait]
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    async fn find(&self, filter: &Filter, options: &QueryOptions) -> Result<Option<Entity>, DataError>;

    async fn find_many(&self, filter: &Filter, options: &QueryOptions) -> Result<Vec<Entity>, DataError>;

    async fn update(
        &self,
        filter: &Filter,
        changes: &Map<String, Value>,
        options: &QueryOptions,
    ) -> Result<Option<Entity>, DataError>;

    async fn update_many(
        &self,
        filter: &Filter,
        changes: &Map<String, Value>,
        options: &QueryOptions,
    ) -> Result<Vec<Entity>, DataError>;

    async fn delete(&self, filter: &Filter, options: &QueryOptions) -> Result<(), DataError>;

    async fn delete_many(&self, filter: &Filter, options: &QueryOptions) -> Result<(), DataError>;

    /// Build an unsaved entity from client attributes.
    fn spawn(&self, attributes: Map<String, Value>) -> Entity;

    fn spawn_many(&self, items: Vec<Map<String, Value>>) -> Vec<Entity> {
        items.into_iter().map(|attributes| self.spawn(attributes)).collect()
    }

    /// Insert or fully overwrite the entity, validating it first.
    async fn persist(&self, entity: Entity) -> Result<Entity, DataError>;

    async fn persist_many(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, DataError>;
}

/// Models known to the host, injected at mount time.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<dyn Model>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Arc<dyn Model>) -> &mut Self {
        self.models.insert(model.name().to_string(), model);
        self
    }

    pub fn with(mut self, model: Arc<dyn Model>) -> Self {
        self.register(model);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Model>> {
        self.models.get(name).cloned()
    }

    /// Sorted so pattern resolution is deterministic.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
