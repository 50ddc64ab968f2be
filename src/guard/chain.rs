//! Guard chain resolution: from a middleware table to the ordered list of steps
//! run for one (action, plurality) pair.

use crate::error::{ApiError, ErrorCause};
use crate::guard::{GuardFlow, MiddlewareTable, SharedGuard, SlotName, SlotValue};
use crate::handlers;
use crate::model::Model;
use crate::request::{Action, HttpVerb, Plurality, RequestDescriptor};
use axum::response::Response;
use std::fmt;

#[derive(Clone)]
pub enum ChainLink {
    Guard(SharedGuard),
    /// Built-in refusal (403) for hard-disabled operations.
    Forbidden,
    /// Built-in CRUD handler.
    Terminal { action: Action, plurality: Plurality },
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainLink::Guard(_) => f.write_str("Guard"),
            ChainLink::Forbidden => f.write_str("Forbidden"),
            ChainLink::Terminal { action, plurality } => write!(f, "Terminal({} {})", action, plurality),
        }
    }
}

/// Compute the chain for one operation.
///
/// The verb, action and plurality slots are collected in that order, absent
/// ones skipped and identical ones kept once. A `false` among them, or `all`
/// set to `false` while any of them is populated, collapses the operation to
/// [`ChainLink::Forbidden`]. Guards of the `all` slot always run first.
pub fn resolve(table: &MiddlewareTable, action: Action, plurality: Plurality, verb: HttpVerb) -> Vec<ChainLink> {
    let candidates = [
        SlotName::for_verb(verb),
        SlotName::for_action(action),
        SlotName::for_plurality(action, plurality),
    ];
    let mut specific: Vec<(SlotName, &SlotValue)> = Vec::with_capacity(candidates.len());
    for slot in candidates {
        let Some(value) = table.get(slot) else {
            continue;
        };
        if specific.iter().any(|(s, v)| *s == slot || *v == value) {
            continue;
        }
        specific.push((slot, value));
    }

    let mut chain: Vec<ChainLink> = table
        .get(SlotName::All)
        .map(|all| all.guards().iter().cloned().map(ChainLink::Guard).collect())
        .unwrap_or_default();

    let all_disabled = matches!(table.get(SlotName::All), Some(SlotValue::Disabled));
    let any_disabled = specific.iter().any(|(_, v)| matches!(v, SlotValue::Disabled));
    if (all_disabled && !specific.is_empty()) || any_disabled {
        chain.push(ChainLink::Forbidden);
        return chain;
    }

    chain.extend(
        specific
            .iter()
            .flat_map(|(_, value)| value.guards().iter().cloned())
            .map(ChainLink::Guard),
    );
    chain.push(ChainLink::Terminal { action, plurality });
    chain
}

/// Walk `chain` for one request until a link answers.
pub async fn run(chain: &[ChainLink], request: &mut RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    for link in chain {
        match link {
            ChainLink::Guard(guard) => match guard.check(request, model).await? {
                GuardFlow::Continue => continue,
                GuardFlow::Respond(response) => return Ok(response),
            },
            ChainLink::Forbidden => {
                return Err(ApiError::forbidden(Some(ErrorCause::Request(format!(
                    "{} on {} ({}) is disabled",
                    request.verb, request.model, request.plurality
                )))))
            }
            ChainLink::Terminal { action, plurality } => {
                return handlers::execute(*action, *plurality, request, model).await
            }
        }
    }
    Err(ApiError::server_error(Some(ErrorCause::Native(
        "guard chain ended without answering".into(),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{guard_fn, GuardFlow};
    use std::sync::Arc;

    fn noop() -> SharedGuard {
        guard_fn(|_| Ok(GuardFlow::Continue))
    }

    fn same(link: &ChainLink, guard: &SharedGuard) -> bool {
        matches!(link, ChainLink::Guard(g) if Arc::ptr_eq(g, guard))
    }

    fn every_operation() -> impl Iterator<Item = (Action, Plurality)> {
        HttpVerb::ALL
            .into_iter()
            .flat_map(|verb| Plurality::ALL.into_iter().map(move |p| (verb.action(), p)))
    }

    #[test]
    fn empty_table_runs_only_the_terminal() {
        let chain = resolve(&MiddlewareTable::new(), Action::Find, Plurality::Plural, HttpVerb::Get);
        assert!(matches!(
            chain.as_slice(),
            [ChainLink::Terminal { action: Action::Find, plurality: Plurality::Plural }]
        ));
    }

    #[test]
    fn guards_run_all_then_verb_then_action_then_plurality() {
        let (all, get, find, find_one, find_many) = (noop(), noop(), noop(), noop(), noop());
        let table = MiddlewareTable::new()
            .guard(SlotName::All, all.clone())
            .guard(SlotName::Get, get.clone())
            .guard(SlotName::Find, find.clone())
            .guard(SlotName::FindOne, find_one.clone())
            .guard(SlotName::FindMany, find_many);
        let chain = resolve(&table, Action::Find, Plurality::Singular, HttpVerb::Get);
        assert_eq!(chain.len(), 5);
        assert!(same(&chain[0], &all));
        assert!(same(&chain[1], &get));
        assert!(same(&chain[2], &find));
        assert!(same(&chain[3], &find_one));
        assert!(matches!(chain[4], ChainLink::Terminal { .. }));
    }

    #[test]
    fn guard_lists_keep_declaration_order() {
        let (first, second) = (noop(), noop());
        let table = MiddlewareTable::new().guards(SlotName::InsertMany, vec![first.clone(), second.clone()]);
        let chain = resolve(&table, Action::Insert, Plurality::Plural, HttpVerb::Post);
        assert!(same(&chain[0], &first));
        assert!(same(&chain[1], &second));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn shared_delete_slot_runs_once() {
        let delete = noop();
        let table = MiddlewareTable::new().guard(SlotName::Delete, delete.clone());
        let chain = resolve(&table, Action::Delete, Plurality::Singular, HttpVerb::Delete);
        assert_eq!(chain.len(), 2);
        assert!(same(&chain[0], &delete));
    }

    #[test]
    fn same_guard_in_two_slots_runs_once() {
        let guard = noop();
        let table = MiddlewareTable::new()
            .guard(SlotName::Patch, guard.clone())
            .guard(SlotName::UpdateMany, guard.clone());
        let chain = resolve(&table, Action::Update, Plurality::Plural, HttpVerb::Patch);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn allowed_placeholders_are_dropped() {
        let table = MiddlewareTable::new().allow(SlotName::Find).allow(SlotName::All);
        let chain = resolve(&table, Action::Find, Plurality::Singular, HttpVerb::Get);
        assert!(matches!(chain.as_slice(), [ChainLink::Terminal { .. }]));
    }

    #[test]
    fn disabled_specific_slot_wins_over_guards() {
        let table = MiddlewareTable::new()
            .guard(SlotName::Post, noop())
            .disable(SlotName::InsertOne);
        let chain = resolve(&table, Action::Insert, Plurality::Singular, HttpVerb::Post);
        assert!(matches!(chain.as_slice(), [ChainLink::Forbidden]));
        let plural = resolve(&table, Action::Insert, Plurality::Plural, HttpVerb::Post);
        assert_eq!(plural.len(), 2);
    }

    #[test]
    fn all_false_with_populated_slots_forbids_every_operation() {
        let table = MiddlewareTable::new()
            .disable(SlotName::All)
            .guard(SlotName::Get, noop())
            .guard(SlotName::Post, noop())
            .guard(SlotName::Patch, noop())
            .allow(SlotName::Put)
            .guard(SlotName::Delete, noop());
        for (action, plurality) in every_operation() {
            let chain = resolve(&table, action, plurality, action.verb());
            assert!(matches!(chain.as_slice(), [ChainLink::Forbidden]), "{} {}", action, plurality);
        }
    }

    #[test]
    fn all_false_alone_does_not_forbid() {
        let table = MiddlewareTable::new().disable(SlotName::All);
        let chain = resolve(&table, Action::Find, Plurality::Plural, HttpVerb::Get);
        assert!(matches!(chain.as_slice(), [ChainLink::Terminal { .. }]));
    }

    #[test]
    fn all_guard_still_runs_before_forbidden() {
        let all = noop();
        let table = MiddlewareTable::new().guard(SlotName::All, all.clone()).disable(SlotName::Put);
        let chain = resolve(&table, Action::Replace, Plurality::Plural, HttpVerb::Put);
        assert_eq!(chain.len(), 2);
        assert!(same(&chain[0], &all));
        assert!(matches!(chain[1], ChainLink::Forbidden));
    }
}
