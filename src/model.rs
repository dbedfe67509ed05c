//! Core data model.
//!
//! A telex is a work item identified by its telex number. It needs sign-off
//! from two independent tracks (widebody and narrowbody) before it counts as
//! done. Status and completion time are derived from the two assignees and
//! never set directly.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Newtype for telex ids. Assigned by the store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TelexId(pub i64);

impl std::fmt::Display for TelexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// Telex Record
// ---------------------------------------------------------------------------

/// One tracked telex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelexRecord {
    pub id: TelexId,

    /// Free-form, may contain embedded newlines.
    pub telex_number: String,

    /// Derived from the two assignees; see [`TelexRecord::derive_status`].
    pub status: Status,

    pub assignee_widebody: Option<String>,
    pub assignee_narrowbody: Option<String>,

    /// Stored as given. An empty string is a remark, not "no remark".
    pub remark: Option<String>,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TelexRecord {
    pub fn assignee(&self, track: Track) -> Option<&str> {
        match track {
            Track::Widebody => self.assignee_widebody.as_deref(),
            Track::Narrowbody => self.assignee_narrowbody.as_deref(),
        }
    }

    /// Set one track's assignee and re-derive status.
    ///
    /// An empty name unassigns the track.
    pub fn assign(&mut self, track: Track, name: &str, now: DateTime<Utc>) {
        let value = (!name.is_empty()).then(|| name.to_string());
        match track {
            Track::Widebody => self.assignee_widebody = value,
            Track::Narrowbody => self.assignee_narrowbody = value,
        }
        self.derive_status(now);
    }

    /// Both tracks carry a non-empty assignee.
    pub fn both_tracks_assigned(&self) -> bool {
        is_filled(&self.assignee_widebody) && is_filled(&self.assignee_narrowbody)
    }

    /// Recompute status from scratch.
    ///
    /// DONE iff both assignees are non-empty. Entering DONE stamps
    /// `completed_at` once; leaving it clears the stamp, so
    /// `completed_at.is_some() == (status == Done)` always holds.
    pub fn derive_status(&mut self, now: DateTime<Utc>) {
        if self.both_tracks_assigned() {
            self.status = Status::Done;
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.status = Status::Pending;
            self.completed_at = None;
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Completion status of a telex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// At least one track is still unassigned.
    #[default]
    Pending,
    /// Both tracks signed off.
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Done => "DONE",
        }
    }

    /// Label shown on the listing page.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "BELUM DIKERJAKAN",
            Status::Done => "SUDAH DIKERJAKAN",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(Status::Pending),
            "DONE" => Ok(Status::Done),
            other => Err(Error::Other(format!("unknown telex status: {other}"))),
        }
    }
}

/// A status change caused by one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// PENDING -> DONE: the second track was filled.
    Completed,
    /// DONE -> PENDING: a track was cleared.
    Reopened,
}

impl Transition {
    /// `None` when the status did not change.
    pub fn between(before: Status, after: Status) -> Option<Self> {
        match (before, after) {
            (Status::Pending, Status::Done) => Some(Transition::Completed),
            (Status::Done, Status::Pending) => Some(Transition::Reopened),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// One of the two sign-off tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Widebody,
    Narrowbody,
}

impl Track {
    pub fn as_str(self) -> &'static str {
        match self {
            Track::Widebody => "widebody",
            Track::Narrowbody => "narrowbody",
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Track {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "widebody" => Ok(Track::Widebody),
            "narrowbody" => Ok(Track::Narrowbody),
            other => Err(Error::InvalidTrackKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Every record in listing order, plus status counters.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub records: Vec<TelexRecord>,
    pub pending: usize,
    pub done: usize,
}

impl Listing {
    pub fn new(records: Vec<TelexRecord>) -> Self {
        let done = records.iter().filter(|r| r.status == Status::Done).count();
        let pending = records.len() - done;
        Self {
            records,
            pending,
            done,
        }
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Storage format. Fixed width, so lexical order is chronological order.
const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Human-facing format used in the listing and the CSV export.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current time at storage precision, so a stamp survives a round trip
/// through the store unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_stored(ts: DateTime<Utc>) -> String {
    ts.format(STORED_FORMAT).to_string()
}

pub fn parse_stored(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Other(format!("invalid stored timestamp {s:?}: {e}")))
}

pub fn format_display(ts: DateTime<Utc>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}
