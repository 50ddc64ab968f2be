//! In-memory data-access layer. Serves tests and the demo binary; any real
//! persistence plugs in through the [`Model`] trait instead.

use crate::error::DataError;
use crate::model::{Entity, Filter, Model, QueryOptions};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Source name recorded in each entity's id hash.
pub const MEMORY_SOURCE: &str = "memory";

pub struct MemoryModel {
    name: String,
    required: Vec<String>,
    items: RwLock<Vec<Entity>>,
    calls: AtomicUsize,
}

impl MemoryModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            items: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Attributes that must be present and non-null on every persisted entity.
    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the store content without validation. Returns the stored entities.
    pub fn seed(&self, items: Vec<Map<String, Value>>) -> Result<Vec<Entity>, DataError> {
        let entities: Vec<Entity> = items.into_iter().map(|attributes| self.spawn(attributes)).collect();
        *self.write()? = entities.clone();
        Ok(entities)
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Entity> {
        self.items.read().map(|items| items.clone()).unwrap_or_default()
    }

    /// Number of data-access calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Entity>>, DataError> {
        self.items.read().map_err(|_| DataError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Entity>>, DataError> {
        self.items.write().map_err(|_| DataError::Backend("store lock poisoned".into()))
    }

    fn validate(&self, entity: &Entity) -> Result<(), String> {
        for field in &self.required {
            match entity.attributes.get(field) {
                None | Some(Value::Null) => {
                    return Err(format!("{}: attribute '{}' is required", self.name, field));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn validate_set(&self, entities: &[Entity]) -> Result<(), DataError> {
        let errors: Vec<String> = entities.iter().filter_map(|e| self.validate(e).err()).collect();
        if errors.is_empty() {
            return Ok(());
        }
        Err(DataError::SetValidation {
            message: format!("{} of {} entities failed validation", errors.len(), entities.len()),
            errors,
        })
    }

    /// Positions of matching entities, after sorting and paging.
    fn select(items: &[Entity], filter: &Filter, options: &QueryOptions) -> Vec<usize> {
        let mut positions: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, e)| matches(e, filter))
            .map(|(i, _)| i)
            .collect();
        if let Some(sort) = &options.sort {
            let keys = sort_keys(sort);
            positions.sort_by(|a, b| {
                keys.iter()
                    .map(|(field, descending)| {
                        let ord = compare(field_value(&items[*a], field), field_value(&items[*b], field));
                        if *descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        let skip = match (options.skip, options.page, options.limit) {
            (Some(skip), _, _) => skip,
            (None, Some(page), Some(limit)) => page.saturating_mul(limit),
            _ => 0,
        };
        let limit = options.limit.unwrap_or(u64::MAX);
        positions
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect()
    }

    fn upsert(items: &mut Vec<Entity>, entity: Entity) {
        match items.iter_mut().find(|e| e.id == entity.id) {
            Some(existing) => *existing = entity,
            None => items.push(entity),
        }
    }
}

fn field_value<'a>(entity: &'a Entity, field: &str) -> Option<&'a Value> {
    if field == "id" {
        Some(&entity.id)
    } else {
        entity.attributes.get(field)
    }
}

fn matches(entity: &Entity, filter: &Filter) -> bool {
    filter.iter().all(|(field, expected)| match field_value(entity, field) {
        Some(actual) => loose_eq(actual, expected),
        None => expected.is_null(),
    })
}

/// Query-string values arrive as strings; compare them against typed attributes.
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (s.parse::<f64>(), n.as_f64()) {
                (Ok(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => s == &b.to_string(),
        _ => false,
    }
}

/// `"field"`, `"-field"`, or `{"field": "asc" | "desc"}`.
fn sort_keys(sort: &Value) -> Vec<(String, bool)> {
    match sort {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('-') {
                Some(field) => (field.to_string(), true),
                None => (s.to_string(), false),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(field, dir)| {
                let descending = matches!(dir.as_str(), Some(d) if d.eq_ignore_ascii_case("desc"))
                    || dir.as_i64() == Some(-1);
                (field.clone(), descending)
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl Model for MemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, filter: &Filter, options: &QueryOptions) -> Result<Option<Entity>, DataError> {
        self.record_call();
        let items = self.read()?;
        Ok(Self::select(&items, filter, options)
            .first()
            .map(|i| items[*i].clone()))
    }

    async fn find_many(&self, filter: &Filter, options: &QueryOptions) -> Result<Vec<Entity>, DataError> {
        self.record_call();
        let items = self.read()?;
        Ok(Self::select(&items, filter, options)
            .into_iter()
            .map(|i| items[i].clone())
            .collect())
    }

    async fn update(
        &self,
        filter: &Filter,
        changes: &Map<String, Value>,
        options: &QueryOptions,
    ) -> Result<Option<Entity>, DataError> {
        self.record_call();
        let mut items = self.write()?;
        let Some(position) = Self::select(&items, filter, options).first().copied() else {
            return Ok(None);
        };
        let mut updated = items[position].clone();
        for (key, value) in changes.iter().filter(|(k, _)| k.as_str() != "id") {
            updated.attributes.insert(key.clone(), value.clone());
        }
        self.validate(&updated).map_err(DataError::Validation)?;
        items[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn update_many(
        &self,
        filter: &Filter,
        changes: &Map<String, Value>,
        options: &QueryOptions,
    ) -> Result<Vec<Entity>, DataError> {
        self.record_call();
        let mut items = self.write()?;
        let positions = Self::select(&items, filter, options);
        let updated: Vec<Entity> = positions
            .iter()
            .map(|i| {
                let mut entity = items[*i].clone();
                for (key, value) in changes.iter().filter(|(k, _)| k.as_str() != "id") {
                    entity.attributes.insert(key.clone(), value.clone());
                }
                entity
            })
            .collect();
        self.validate_set(&updated)?;
        for (position, entity) in positions.iter().zip(updated.iter()) {
            items[*position] = entity.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, filter: &Filter, options: &QueryOptions) -> Result<(), DataError> {
        self.record_call();
        let mut items = self.write()?;
        if let Some(position) = Self::select(&items, filter, options).first().copied() {
            items.remove(position);
        }
        Ok(())
    }

    async fn delete_many(&self, filter: &Filter, options: &QueryOptions) -> Result<(), DataError> {
        self.record_call();
        let mut items = self.write()?;
        let doomed: HashSet<usize> = Self::select(&items, filter, options).into_iter().collect();
        let mut index = 0;
        items.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        tracing::debug!(model = %self.name, removed = doomed.len(), "delete_many");
        Ok(())
    }

    fn spawn(&self, mut attributes: Map<String, Value>) -> Entity {
        attributes.remove("id");
        let id = Value::String(uuid::Uuid::new_v4().to_string());
        let mut entity = Entity::new(id.clone(), attributes);
        entity.id_hash.insert(MEMORY_SOURCE.to_string(), id);
        entity
    }

    async fn persist(&self, entity: Entity) -> Result<Entity, DataError> {
        self.record_call();
        self.validate(&entity).map_err(DataError::Validation)?;
        let mut items = self.write()?;
        Self::upsert(&mut items, entity.clone());
        Ok(entity)
    }

    async fn persist_many(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, DataError> {
        self.record_call();
        self.validate_set(&entities)?;
        let mut items = self.write()?;
        for entity in &entities {
            Self::upsert(&mut items, entity.clone());
        }
        Ok(entities)
    }
}
