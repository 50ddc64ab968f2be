//! Named middleware slots of an exposed model.

use crate::guard::SharedGuard;
use crate::request::{Action, HttpVerb, Plurality};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Slot names. `Delete` is shared by the DELETE verb and the delete action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotName {
    All,

    Get,
    Post,
    Patch,
    Put,
    Delete,

    Find,
    Insert,
    Update,
    Replace,

    FindOne,
    FindMany,
    InsertOne,
    InsertMany,
    UpdateOne,
    UpdateMany,
    DeleteOne,
    DeleteMany,
    ReplaceOne,
    ReplaceMany,
}

impl SlotName {
    pub fn for_verb(verb: HttpVerb) -> Self {
        match verb {
            HttpVerb::Get => SlotName::Get,
            HttpVerb::Post => SlotName::Post,
            HttpVerb::Patch => SlotName::Patch,
            HttpVerb::Put => SlotName::Put,
            HttpVerb::Delete => SlotName::Delete,
        }
    }

    pub fn for_action(action: Action) -> Self {
        match action {
            Action::Find => SlotName::Find,
            Action::Insert => SlotName::Insert,
            Action::Update => SlotName::Update,
            Action::Delete => SlotName::Delete,
            Action::Replace => SlotName::Replace,
        }
    }

    pub fn for_plurality(action: Action, plurality: Plurality) -> Self {
        use Plurality::{Plural, Singular};
        match (action, plurality) {
            (Action::Find, Singular) => SlotName::FindOne,
            (Action::Find, Plural) => SlotName::FindMany,
            (Action::Insert, Singular) => SlotName::InsertOne,
            (Action::Insert, Plural) => SlotName::InsertMany,
            (Action::Update, Singular) => SlotName::UpdateOne,
            (Action::Update, Plural) => SlotName::UpdateMany,
            (Action::Delete, Singular) => SlotName::DeleteOne,
            (Action::Delete, Plural) => SlotName::DeleteMany,
            (Action::Replace, Singular) => SlotName::ReplaceOne,
            (Action::Replace, Plural) => SlotName::ReplaceMany,
        }
    }
}

/// Content of a populated slot. An absent slot is simply not in the table.
#[derive(Clone)]
pub enum SlotValue {
    /// `false`: the operation is refused with 403.
    Disabled,
    /// `true`: explicitly allowed, no extra guard.
    Allowed,
    Guard(SharedGuard),
    GuardList(Vec<SharedGuard>),
}

impl SlotValue {
    pub fn guards(&self) -> &[SharedGuard] {
        match self {
            SlotValue::Guard(guard) => std::slice::from_ref(guard),
            SlotValue::GuardList(list) => list,
            SlotValue::Disabled | SlotValue::Allowed => &[],
        }
    }
}

impl PartialEq for SlotValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SlotValue::Disabled, SlotValue::Disabled) | (SlotValue::Allowed, SlotValue::Allowed) => true,
            (SlotValue::Guard(a), SlotValue::Guard(b)) => Arc::ptr_eq(a, b),
            (SlotValue::GuardList(a), SlotValue::GuardList(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Disabled => f.write_str("false"),
            SlotValue::Allowed => f.write_str("true"),
            SlotValue::Guard(_) => f.write_str("Guard"),
            SlotValue::GuardList(list) => write!(f, "GuardList({})", list.len()),
        }
    }
}

impl From<bool> for SlotValue {
    fn from(allowed: bool) -> Self {
        if allowed {
            SlotValue::Allowed
        } else {
            SlotValue::Disabled
        }
    }
}

/// Only booleans can be written in JSON; guards are attached in code.
impl<'de> Deserialize<'de> for SlotValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(SlotValue::from)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareTable {
    slots: HashMap<SlotName, SlotValue>,
}

impl MiddlewareTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, slot: SlotName, value: SlotValue) -> Self {
        self.slots.insert(slot, value);
        self
    }

    pub fn guard(self, slot: SlotName, guard: SharedGuard) -> Self {
        self.set(slot, SlotValue::Guard(guard))
    }

    pub fn guards(self, slot: SlotName, guards: Vec<SharedGuard>) -> Self {
        self.set(slot, SlotValue::GuardList(guards))
    }

    pub fn disable(self, slot: SlotName) -> Self {
        self.set(slot, SlotValue::Disabled)
    }

    pub fn allow(self, slot: SlotName) -> Self {
        self.set(slot, SlotValue::Allowed)
    }

    pub fn get(&self, slot: SlotName) -> Option<&SlotValue> {
        self.slots.get(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
