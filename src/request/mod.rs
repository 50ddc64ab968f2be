//! Per-request types: verbs, actions, plurality, query parsing and the request descriptor.

pub mod descriptor;
pub mod query;

pub use descriptor::*;
pub use query::*;

use axum::http::Method;
use serde::Serialize;
use std::fmt;

/// HTTP verbs that map onto a CRUD action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Delete,
    Patch,
    Post,
    Put,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 5] = [HttpVerb::Get, HttpVerb::Delete, HttpVerb::Patch, HttpVerb::Post, HttpVerb::Put];

    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET | Method::HEAD => Some(HttpVerb::Get),
            Method::DELETE => Some(HttpVerb::Delete),
            Method::PATCH => Some(HttpVerb::Patch),
            Method::POST => Some(HttpVerb::Post),
            Method::PUT => Some(HttpVerb::Put),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
        }
    }

    pub fn action(self) -> Action {
        match self {
            HttpVerb::Get => Action::Find,
            HttpVerb::Delete => Action::Delete,
            HttpVerb::Patch => Action::Update,
            HttpVerb::Post => Action::Insert,
            HttpVerb::Put => Action::Replace,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Find,
    Delete,
    Update,
    Insert,
    Replace,
}

impl Action {
    pub fn verb(self) -> HttpVerb {
        match self {
            Action::Find => HttpVerb::Get,
            Action::Delete => HttpVerb::Delete,
            Action::Update => HttpVerb::Patch,
            Action::Insert => HttpVerb::Post,
            Action::Replace => HttpVerb::Put,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Find => "find",
            Action::Delete => "delete",
            Action::Update => "update",
            Action::Insert => "insert",
            Action::Replace => "replace",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a request targets one entity or a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plurality {
    Singular,
    Plural,
}

impl Plurality {
    pub const ALL: [Plurality; 2] = [Plurality::Singular, Plurality::Plural];
}

impl fmt::Display for Plurality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Plurality::Singular => "singular",
            Plurality::Plural => "plural",
        })
    }
}
