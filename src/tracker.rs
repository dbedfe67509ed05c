//! Record operations: the tracker's public API.
//!
//! Each operation is one bounded read-modify-write against the store.
//! Status is always re-derived through [`TelexRecord::assign`], never set
//! by callers.

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use tracing::Instrument;

use crate::db::Db;
use crate::error::Result;
use crate::export::{self, CsvExport};
use crate::model::{self, Listing, Status, TelexId, TelexRecord, Track, Transition};
use crate::telemetry::{metrics, telex as spans};

/// Result of [`Tracker::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created(TelexId),
    /// Empty or missing telex number. Nothing was stored.
    Skipped,
}

/// Result of [`Tracker::assign_track`].
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The telex as committed.
    pub record: TelexRecord,
    /// Status change this assignment caused, if any.
    pub transition: Option<Transition>,
}

#[derive(Clone)]
pub struct Tracker {
    db: Db,
}

impl Tracker {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Create a PENDING telex. An empty or missing number is ignored.
    pub async fn add(&self, telex_number: Option<&str>) -> Result<AddOutcome> {
        let Some(number) = telex_number.filter(|n| !n.is_empty()) else {
            tracing::debug!("empty telex number, nothing created");
            return Ok(AddOutcome::Skipped);
        };

        let span = spans::start_operation_span("add", None);
        async {
            let id = self.db.create_telex(number, model::now()).await?;
            spans::record_id(&tracing::Span::current(), id);
            metrics::telex_created().add(1, &[]);
            tracing::info!("telex created");
            Ok(AddOutcome::Created(id))
        }
        .instrument(span)
        .await
    }

    pub async fn get(&self, id: TelexId) -> Result<TelexRecord> {
        self.db.get_telex(id).await
    }

    /// Set one track's assignee and re-derive status. An empty name
    /// unassigns the track, which reopens a DONE telex.
    pub async fn assign_track(&self, id: TelexId, track: Track, name: &str) -> Result<Assignment> {
        let span = spans::start_operation_span("assign_track", Some(id));
        let now = model::now();
        let mut before = Status::Pending;

        let record = self
            .db
            .update_telex(id, |record| {
                before = record.status;
                record.assign(track, name, now);
            })
            .instrument(span.clone())
            .await?;

        metrics::telex_track_assigned().add(1, &[KeyValue::new("track", track.as_str())]);
        let transition = Transition::between(before, record.status);
        match transition {
            Some(Transition::Completed) => metrics::telex_completed().add(1, &[]),
            Some(Transition::Reopened) => metrics::telex_reopened().add(1, &[]),
            None => {}
        }
        if transition.is_some() {
            spans::record_status_transition(&span, before, record.status);
        }
        Ok(Assignment { record, transition })
    }

    /// Like [`Tracker::assign_track`], with the track given as its selector
    /// string. The id is checked first, so a missing telex is `NotFound`
    /// even when the selector is also bad; a bad selector on an existing
    /// telex is `InvalidTrackKind` and nothing is written.
    pub async fn assign_track_by_kind(
        &self,
        id: TelexId,
        kind: &str,
        name: &str,
    ) -> Result<Assignment> {
        self.db.get_telex(id).await?;
        let track: Track = kind.parse()?;
        self.assign_track(id, track, name).await
    }

    /// Overwrite the remark. An empty string is stored as-is.
    pub async fn set_remark(&self, id: TelexId, remark: Option<&str>) -> Result<TelexRecord> {
        let span = spans::start_operation_span("set_remark", Some(id));
        self.db
            .update_telex(id, |record| record.remark = remark.map(str::to_string))
            .instrument(span)
            .await
    }

    /// Permanently remove a telex.
    pub async fn delete(&self, id: TelexId) -> Result<()> {
        let span = spans::start_operation_span("delete", Some(id));
        self.db.delete_telex(id).instrument(span).await?;
        metrics::telex_deleted().add(1, &[]);
        tracing::info!(telex.id = id.0, "telex deleted");
        Ok(())
    }

    /// Every telex, newest first, with PENDING / DONE counters.
    pub async fn list_all(&self) -> Result<Listing> {
        let records = self.db.list_telexes().await?;
        Ok(Listing::new(records))
    }

    /// Render every telex, in listing order, as a CSV download.
    pub async fn export_csv(&self, now: DateTime<Utc>) -> Result<CsvExport> {
        let span = spans::start_operation_span("export_csv", None);
        let listing = self.list_all().instrument(span.clone()).await?;
        let export = export::render(&listing.records, now)?;
        metrics::telex_exported().add(1, &[]);
        span.in_scope(|| tracing::info!(rows = listing.total(), file = %export.filename, "csv exported"));
        Ok(export)
    }
}
