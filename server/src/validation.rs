//! Input validation for event creation.
//!
//! Checks run in a fixed order: required fields, then the date, then the
//! invitee list. The first failure is reported.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::EventSettings;
use crate::models::{EventDraft, NewEvent};

// Loose on purpose: any character may separate the numeric groups and the
// match may sit anywhere in the string. Digits and whitespace are ASCII only.
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{4}(.[0-9]{2}){2}([\t\n\f\r ]|T)([0-9]{2}.){2}[0-9]{2}")
        .expect("date pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<local>[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+)@(?P<domain>[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*)$",
    )
    .expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("incorrect datetime format")]
    InvalidDate,

    #[error("invitees exceed capacity: current invitees: {count}, capacity: {max}")]
    TooManyInvitees { count: usize, max: usize },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Turns a raw request payload into a value the repository can trust.
pub trait Validate {
    type Valid;

    fn validate(self, settings: &EventSettings) -> Result<Self::Valid, ValidationError>;
}

impl Validate for NewEvent {
    type Valid = EventDraft;

    fn validate(self, settings: &EventSettings) -> Result<EventDraft, ValidationError> {
        let draft = EventDraft {
            name: required(self.name, "name")?,
            date: required(self.date, "date")?,
            languages: required(self.languages, "languages")?,
            video_qualities: required(self.video_qualities, "VideoQuality")?,
            audio_qualities: required(self.audio_qualities, "AudioQuality")?,
            invitees: required(self.invitees, "invitees")?,
            description: self.description.filter(|d| !d.is_empty()),
        };

        validate_date(&draft.date)?;
        validate_invitees(&draft.invitees, settings.max_invitees)?;

        Ok(draft)
    }
}

trait Present {
    fn is_present(&self) -> bool;
}

impl Present for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Present for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

fn required<T: Present>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value
        .filter(Present::is_present)
        .ok_or(ValidationError::MissingField(field))
}

pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    if DATE_RE.is_match(date) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate)
    }
}

pub fn validate_invitees(invitees: &[String], max: usize) -> Result<(), ValidationError> {
    if invitees.len() > max {
        return Err(ValidationError::TooManyInvitees {
            count: invitees.len(),
            max,
        });
    }

    match invitees.iter().find(|invitee| !EMAIL_RE.is_match(invitee)) {
        Some(invalid) => Err(ValidationError::InvalidEmail(invalid.clone())),
        None => Ok(()),
    }
}
