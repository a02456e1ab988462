use thiserror::Error;

use crate::models::Coordinates;

/// Errors from translating between program coordinates and day indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid coordinates {0}")]
    InvalidCoordinate(Coordinates),

    #[error("day {day} is outside a program of {length} days")]
    DayOutOfRange { day: usize, length: usize },
}

/// The first structural problem found while validating a program or workout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("program is empty")]
    EmptyProgram,

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{0} is longer than 255 characters")]
    TooLong(&'static str),

    #[error("missing span")]
    MissingSpan,

    #[error("not enough workouts: {workouts} listed for a span of {span}")]
    NotEnoughWorkouts { span: usize, workouts: usize },

    #[error("invalid block {index}: {source}")]
    Block {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid microcycle {index}: {source}")]
    MicroCycle {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid workout {index}: {source}")]
    Workout {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid segment {index}: {source}")]
    Segment {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    pub(crate) fn in_block(self, index: usize) -> Self {
        ValidationError::Block {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_micro_cycle(self, index: usize) -> Self {
        ValidationError::MicroCycle {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_workout(self, index: usize) -> Self {
        ValidationError::Workout {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_segment(self, index: usize) -> Self {
        ValidationError::Segment {
            index,
            source: Box::new(self),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event not found: {0}")]
    EventNotFound(String),
}

/// Failures talking to the persistence service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in: {0}")]
    NotLoggedIn(String),

    #[error("request failed with {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid program: {0}")]
    InvalidProgram(#[from] ValidationError),

    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
