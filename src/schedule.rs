//! Navigation of the block / microcycle / workout tree and translation
//! between hierarchical coordinates and zero-based day indices.
//!
//! Each microcycle owns the half-open day range `[start, start + span)`, so a
//! day that lands exactly on a boundary belongs to the following microcycle.

use crate::error::ScheduleError;
use crate::models::{Coordinates, ProgramShape, Workout};

/// Total number of days in the program: the sum of all microcycle spans.
pub fn program_length<P: ProgramShape + ?Sized>(program: &P) -> usize {
    program
        .blocks()
        .iter()
        .flat_map(|b| b.micro_cycles.iter())
        .map(|mc| mc.span)
        .sum()
}

/// Day index of the workout at `coords`.
pub fn day_index<P: ProgramShape + ?Sized>(
    program: &P,
    coords: Coordinates,
) -> Result<usize, ScheduleError> {
    let Coordinates(b, m, w) = coords;
    let blocks = program.blocks();

    let block = blocks.get(b).ok_or(ScheduleError::InvalidCoordinate(coords))?;
    let cycle = block
        .micro_cycles
        .get(m)
        .ok_or(ScheduleError::InvalidCoordinate(coords))?;
    if w >= cycle.span {
        return Err(ScheduleError::InvalidCoordinate(coords));
    }

    let before_block: usize = blocks[..b]
        .iter()
        .flat_map(|blk| blk.micro_cycles.iter())
        .map(|mc| mc.span)
        .sum();
    let before_cycle: usize = block.micro_cycles[..m].iter().map(|mc| mc.span).sum();

    Ok(before_block + before_cycle + w)
}

/// Coordinates of the workout planned for `day`.
pub fn workout_coords<P: ProgramShape + ?Sized>(
    program: &P,
    day: usize,
) -> Result<Coordinates, ScheduleError> {
    let mut start = 0;
    for (b, block) in program.blocks().iter().enumerate() {
        for (m, cycle) in block.micro_cycles.iter().enumerate() {
            if day < start + cycle.span {
                return Ok(Coordinates(b, m, day - start));
            }
            start += cycle.span;
        }
    }

    Err(ScheduleError::DayOutOfRange { day, length: start })
}

/// The planned workout at `coords`, when the microcycle lists one there.
pub fn workout_at<P: ProgramShape + ?Sized>(
    program: &P,
    coords: Coordinates,
) -> Option<&Workout> {
    program
        .blocks()
        .get(coords.block())?
        .micro_cycles
        .get(coords.micro_cycle())?
        .workouts
        .get(coords.workout())
}

/// All listed workouts in program order.
pub fn workouts<P: ProgramShape + ?Sized>(program: &P) -> impl Iterator<Item = &Workout> {
    program
        .blocks()
        .iter()
        .flat_map(|b| b.micro_cycles.iter())
        .flat_map(|mc| mc.workouts.iter())
}

/// One calendar slot of a program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledDay<'a> {
    pub day_index: usize,
    pub coords: Coordinates,
    /// `None` when the microcycle lists fewer workouts than its span.
    pub workout: Option<&'a Workout>,
}

impl ScheduledDay<'_> {
    pub fn is_rest_day(&self) -> bool {
        self.workout.is_some_and(|w| w.rest_day)
    }
}

/// Every day of the program in order, one entry per unit of microcycle span.
pub fn schedule_days<P: ProgramShape + ?Sized>(
    program: &P,
) -> impl Iterator<Item = ScheduledDay<'_>> {
    program
        .blocks()
        .iter()
        .enumerate()
        .flat_map(|(b, block)| {
            block
                .micro_cycles
                .iter()
                .enumerate()
                .flat_map(move |(m, cycle)| {
                    (0..cycle.span).map(move |w| (Coordinates(b, m, w), cycle.workouts.get(w)))
                })
        })
        .enumerate()
        .map(|(day_index, (coords, workout))| ScheduledDay {
            day_index,
            coords,
            workout,
        })
}
