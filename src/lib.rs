//! Scheduling and progress tracking for homegym training programs.
//!
//! A [`models::Program`] is a reusable plan of blocks, microcycles and
//! workouts. Starting it yields a [`models::ProgramInstance`] bound to a
//! calendar date, whose progress is computed on demand by [`status`].

pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod report;
pub mod schedule;
pub mod status;
pub mod stores;
pub mod validate;
