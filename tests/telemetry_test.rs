//! Integration tests for telemetry initialization and span helpers.

use telex_tracker::model::{Status, TelexId};
use telex_tracker::telemetry::{self, TelemetryConfig, telex};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process, so this may
    // return Err if another test got there first; that is acceptable.
    let _guard = telemetry::init_telemetry(TelemetryConfig {
        endpoint: None,
        service_name: "telex-test".to_string(),
        log_level: "debug".to_string(),
    });
}

#[test]
fn operation_span_records_id_and_transition() {
    let span = telex::start_operation_span("assign_track", Some(TelexId(42)));
    telex::record_status_transition(&span, Status::Pending, Status::Done);

    let span = telex::start_operation_span("add", None);
    telex::record_id(&span, TelexId(7));
}
