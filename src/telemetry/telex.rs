//! Span helpers for record operations.

use tracing::Span;

use crate::model::{Status, TelexId};

/// Start a span for one record operation.
///
/// `telex.id` is declared empty for operations that don't know the id up
/// front (create); fill it with [`record_id`].
pub fn start_operation_span(operation: &'static str, id: Option<TelexId>) -> Span {
    let span = tracing::info_span!(
        "telex.operation",
        "telex.operation" = operation,
        "telex.id" = tracing::field::Empty,
    );
    if let Some(id) = id {
        record_id(&span, id);
    }
    span
}

pub fn record_id(span: &Span, id: TelexId) {
    span.record("telex.id", id.0);
}

/// Emit a status transition event scoped to the given span.
pub fn record_status_transition(span: &Span, from: Status, to: Status) {
    span.in_scope(|| {
        tracing::info!(from = from.as_str(), to = to.as_str(), "status_transition");
    });
}
