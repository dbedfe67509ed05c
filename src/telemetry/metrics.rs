//! Metric instrument factories for telex-tracker.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("telex-tracker")
}

/// Counter: telexes created.
pub fn telex_created() -> Counter<u64> {
    meter()
        .u64_counter("telex.created")
        .with_description("Number of telexes created")
        .build()
}

/// Counter: track assignments (including unassignments).
/// Labels: `track` ("widebody" | "narrowbody").
pub fn telex_track_assigned() -> Counter<u64> {
    meter()
        .u64_counter("telex.track_assigned")
        .with_description("Number of track assignment updates")
        .build()
}

/// Counter: PENDING -> DONE transitions.
pub fn telex_completed() -> Counter<u64> {
    meter()
        .u64_counter("telex.completed")
        .with_description("Number of telexes that became done")
        .build()
}

/// Counter: DONE -> PENDING transitions caused by clearing a track.
pub fn telex_reopened() -> Counter<u64> {
    meter()
        .u64_counter("telex.reopened")
        .with_description("Number of done telexes reverted to pending")
        .build()
}

pub fn telex_deleted() -> Counter<u64> {
    meter()
        .u64_counter("telex.deleted")
        .with_description("Number of telexes deleted")
        .build()
}

/// Counter: CSV exports produced.
pub fn telex_exported() -> Counter<u64> {
    meter()
        .u64_counter("telex.exported")
        .with_description("Number of CSV exports")
        .build()
}
