//! Resolved API: configuration validated and flattened for runtime use.

use crate::guard::{resolve as resolve_chain, ChainLink, MiddlewareTable};
use crate::model::Model;
use crate::request::{HttpVerb, Plurality};
use std::collections::HashMap;
use std::sync::Arc;

/// One exposed model, with its guard chains precomputed per operation.
pub struct ExposedModel {
    pub name: String,
    pub singular: String,
    pub plural: String,
    pub middlewares: MiddlewareTable,
    pub model: Arc<dyn Model>,
    chains: HashMap<(HttpVerb, Plurality), Arc<[ChainLink]>>,
}

impl ExposedModel {
    pub fn new(name: String, singular: String, plural: String, middlewares: MiddlewareTable, model: Arc<dyn Model>) -> Self {
        let mut chains = HashMap::new();
        for verb in HttpVerb::ALL {
            for plurality in Plurality::ALL {
                let chain = resolve_chain(&middlewares, verb.action(), plurality, verb);
                chains.insert((verb, plurality), Arc::from(chain));
            }
        }
        Self {
            name,
            singular,
            plural,
            middlewares,
            model,
            chains,
        }
    }

    pub fn chain(&self, verb: HttpVerb, plurality: Plurality) -> Arc<[ChainLink]> {
        self.chains
            .get(&(verb, plurality))
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn route(&self, plurality: Plurality) -> &str {
        match plurality {
            Plurality::Singular => &self.singular,
            Plurality::Plural => &self.plural,
        }
    }
}

#[derive(Clone, Default)]
pub struct ResolvedApi {
    /// Sorted by model name.
    pub models: Vec<Arc<ExposedModel>>,
}

impl ResolvedApi {
    pub fn model(&self, name: &str) -> Option<&Arc<ExposedModel>> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}
