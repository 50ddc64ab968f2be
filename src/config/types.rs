//! Mount-time configuration types: which models to expose, under which routes,
//! with which middlewares.

use crate::guard::MiddlewareTable;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// Combine two settings picked for the same name; fields set on `newer` win.
pub trait Merge {
    fn merge(self, newer: Self) -> Self;
}

/// A picker value: `true`/`false`, or a structured setting.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Selection<T> {
    Flag(bool),
    Setting(T),
}

impl<T> Selection<T> {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Selection::Flag(false))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelOptions {
    #[serde(default)]
    pub singular: Option<String>,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub middlewares: Option<MiddlewareTable>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singular(mut self, name: impl Into<String>) -> Self {
        self.singular = Some(name.into());
        self
    }

    pub fn plural(mut self, name: impl Into<String>) -> Self {
        self.plural = Some(name.into());
        self
    }

    pub fn middlewares(mut self, table: MiddlewareTable) -> Self {
        self.middlewares = Some(table);
        self
    }
}

impl Merge for ModelOptions {
    fn merge(self, newer: Self) -> Self {
        Self {
            singular: newer.singular.or(self.singular),
            plural: newer.plural.or(self.plural),
            middlewares: newer.middlewares.or(self.middlewares),
        }
    }
}

pub type ModelSelection = Selection<ModelOptions>;

/// `{ "models": { "<name, glob or /regex/>": true | false | { ... } } }`.
/// Picker order is declaration order.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiConfig {
    #[serde(default, deserialize_with = "ordered_pickers")]
    pub models: Vec<(String, ModelSelection)>,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, key: impl Into<String>, selection: ModelSelection) -> Self {
        self.models.push((key.into(), selection));
        self
    }

    pub fn expose(self, key: impl Into<String>, options: ModelOptions) -> Self {
        self.select(key, Selection::Setting(options))
    }

    pub fn enable(self, key: impl Into<String>) -> Self {
        self.select(key, Selection::Flag(true))
    }

    pub fn disable(self, key: impl Into<String>) -> Self {
        self.select(key, Selection::Flag(false))
    }
}

fn ordered_pickers<'de, D, T>(deserializer: D) -> Result<Vec<(String, Selection<T>)>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    struct PickerVisitor<T>(PhantomData<T>);

    impl<'de, T: DeserializeOwned> Visitor<'de> for PickerVisitor<T> {
        type Value = Vec<(String, Selection<T>)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of model names or patterns to true, false or a model setting")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Selection<T>>()? {
                out.push(entry);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(PickerVisitor(PhantomData))
}
