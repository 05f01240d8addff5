use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Direct,
    Slots,
}

impl ScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::Direct => "direct",
            ScheduleMode::Slots => "slots",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Online,
    Offline,
    #[serde(alias = "telephone")]
    Phone,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Online => "online",
            InterviewType::Offline => "offline",
            InterviewType::Phone => "phone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    AwaitingSlot,
    Scheduled,
    Rescheduled,
    Cancelled,
}

impl InterviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewState::AwaitingSlot => "awaiting_slot",
            InterviewState::Scheduled => "scheduled",
            InterviewState::Rescheduled => "rescheduled",
            InterviewState::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "awaiting_slot" => Ok(InterviewState::AwaitingSlot),
            "scheduled" => Ok(InterviewState::Scheduled),
            "rescheduled" => Ok(InterviewState::Rescheduled),
            "cancelled" => Ok(InterviewState::Cancelled),
            other => Err(Error::Internal(format!("Unknown interview state '{}'", other))),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, InterviewState::Cancelled)
    }
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot as proposed by a recruiter, times written as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInput {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Medium-specific location data after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub meeting_link: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScheduleRequest<'a> {
    pub mode: ScheduleMode,
    pub interview_type: InterviewType,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub meeting_link: Option<&'a str>,
    pub location: Option<&'a str>,
    pub interview_date: Option<NaiveDate>,
    pub slots: &'a [SlotInput],
}

/// Validated schedule, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    pub mode: ScheduleMode,
    pub interview_type: InterviewType,
    pub venue: Venue,
    pub state: InterviewState,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub slot_date: Option<NaiveDate>,
    pub windows: Vec<TimeWindow>,
}

pub fn plan_schedule(req: &ScheduleRequest<'_>, now: DateTime<Utc>) -> Result<SchedulePlan> {
    let venue = venue_for(req.interview_type, req.meeting_link, req.location)?;

    match req.mode {
        ScheduleMode::Direct => {
            let scheduled_at = req.scheduled_at.ok_or_else(|| {
                Error::BadRequest("scheduled_at is required for a direct interview".into())
            })?;
            ensure_future(scheduled_at, now)?;
            Ok(SchedulePlan {
                mode: req.mode,
                interview_type: req.interview_type,
                venue,
                state: InterviewState::Scheduled,
                scheduled_at: Some(scheduled_at),
                slot_date: None,
                windows: Vec::new(),
            })
        }
        ScheduleMode::Slots => {
            // Slots may follow in a second call; validate them only when present.
            let (slot_date, windows) = match req.interview_date {
                Some(date) => (Some(date), plan_slots(date, req.slots, now)?),
                None if req.slots.is_empty() => (None, Vec::new()),
                None => {
                    return Err(Error::BadRequest(
                        "interview_date is required when slots are given".into(),
                    ))
                }
            };
            Ok(SchedulePlan {
                mode: req.mode,
                interview_type: req.interview_type,
                venue,
                state: InterviewState::AwaitingSlot,
                scheduled_at: None,
                slot_date,
                windows,
            })
        }
    }
}

pub fn venue_for(
    interview_type: InterviewType,
    meeting_link: Option<&str>,
    location: Option<&str>,
) -> Result<Venue> {
    let meeting_link = meeting_link.map(str::trim).filter(|s| !s.is_empty());
    let location = location.map(str::trim).filter(|s| !s.is_empty());

    match interview_type {
        InterviewType::Online => {
            let link = meeting_link.ok_or_else(|| {
                Error::BadRequest("meeting_link is required for an online interview".into())
            })?;
            let parsed = url::Url::parse(link)
                .map_err(|_| Error::BadRequest("meeting_link must be a valid URL".into()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::BadRequest(
                    "meeting_link must use http or https".into(),
                ));
            }
            Ok(Venue {
                meeting_link: Some(link.to_string()),
                location: None,
            })
        }
        InterviewType::Offline => {
            let location = location.ok_or_else(|| {
                Error::BadRequest("location is required for an offline interview".into())
            })?;
            Ok(Venue {
                meeting_link: None,
                location: Some(location.to_string()),
            })
        }
        InterviewType::Phone => Ok(Venue {
            meeting_link: None,
            location: None,
        }),
    }
}

pub fn plan_slots(date: NaiveDate, slots: &[SlotInput], now: DateTime<Utc>) -> Result<Vec<TimeWindow>> {
    if slots.is_empty() {
        return Err(Error::BadRequest("At least one slot is required".into()));
    }
    if slots.len() > MAX_SLOTS {
        return Err(Error::BadRequest(format!(
            "At most {} slots can be offered",
            MAX_SLOTS
        )));
    }
    if date < now.date_naive() {
        return Err(Error::BadRequest("interview_date cannot be in the past".into()));
    }

    let mut windows: Vec<TimeWindow> = Vec::with_capacity(slots.len());
    for (idx, slot) in slots.iter().enumerate() {
        let start = parse_clock(&slot.start_time)?;
        let end = parse_clock(&slot.end_time)?;
        if start >= end {
            return Err(Error::BadRequest(format!(
                "Slot {} must start before it ends",
                idx + 1
            )));
        }
        if slot_start(date, start) <= now {
            return Err(Error::BadRequest(format!(
                "Slot {} must start in the future",
                idx + 1
            )));
        }
        let window = TimeWindow { start, end };
        if let Some(pos) = windows.iter().position(|w| w.overlaps(&window)) {
            return Err(Error::BadRequest(format!(
                "Slot {} overlaps slot {}",
                idx + 1,
                pos + 1
            )));
        }
        windows.push(window);
    }
    Ok(windows)
}

pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| Error::BadRequest(format!("Invalid time '{}', expected HH:MM", raw)))
}

pub fn ensure_future(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if at <= now {
        return Err(Error::BadRequest("Interview time must be in the future".into()));
    }
    Ok(())
}

/// Concrete interview time once a candidate picks a slot.
pub fn slot_start(date: NaiveDate, start: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(start))
}
