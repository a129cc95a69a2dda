//! Finalize-time structural checks.
//!
//! The walk is fixed: a failure recorded while the configuration block ran
//! wins, then required fields in declaration order, then exclusive groups in
//! declaration order. Only the first violation is reported.

use tracing::{debug, trace};

use crate::error::{DslError, DslResult, StructuralError};
use crate::state::BuilderState;

/// Checks `state` without consuming it.
pub fn check(state: &BuilderState) -> DslResult<()> {
    if let Some(err) = state.failure() {
        return Err(err.clone());
    }
    match first_violation(state) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Consumes the state of a finished configuration block. On success the
/// caller may move its slot values into the instance.
pub fn finalize(state: BuilderState) -> DslResult<()> {
    let shape = state.shape().name();
    match check(&state) {
        Ok(()) => {
            trace!(shape, "finalized");
            Ok(())
        }
        Err(err) => {
            debug!(shape, error = %err, "finalize rejected");
            Err(err)
        }
    }
}

/// Every broken invariant, in the order [`check`] would find them. Failures
/// recorded during configuration are not included.
pub fn violations(state: &BuilderState) -> Vec<StructuralError> {
    missing_fields(state).chain(exclusive_conflicts(state)).collect()
}

/// Extracts the value of a slot the validator has already accepted.
pub fn require<T>(value: Option<T>, shape: &'static str, field: &'static str) -> DslResult<T> {
    value.ok_or(DslError::Structural(StructuralError::MissingField { shape, field }))
}

fn first_violation(state: &BuilderState) -> Option<StructuralError> {
    missing_fields(state)
        .next()
        .or_else(|| exclusive_conflicts(state).next())
}

fn missing_fields(state: &BuilderState) -> impl Iterator<Item = StructuralError> + '_ {
    let shape = state.shape();
    shape
        .fields()
        .iter()
        .zip(state.slots())
        .filter(|(field, slot)| field.is_required() && !slot.is_set())
        .map(move |(field, _)| StructuralError::MissingField {
            shape: shape.name(),
            field: field.name(),
        })
}

fn exclusive_conflicts(state: &BuilderState) -> impl Iterator<Item = StructuralError> + '_ {
    let shape = state.shape();
    shape.exclusive_groups().iter().filter_map(move |group| {
        let set: Vec<&'static str> = group
            .members()
            .iter()
            .zip(group.indices())
            .filter(|(_, index)| state.slot(**index).is_set())
            .map(|(member, _)| *member)
            .collect();
        (set.len() > 1).then(|| StructuralError::ExclusiveConflict {
            shape: shape.name(),
            fields: set,
        })
    })
}
