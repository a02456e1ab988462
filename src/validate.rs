//! Structural checks run before a program, instance or workout is sent to
//! the persistence service. Traversal stops at the first problem found.

use crate::error::ValidationError;
use crate::models::{Block, MicroCycle, Program, ProgramInstance, Segment, Workout};

const MAX_FIELD_CHARS: usize = 255;

pub fn required_field(value: &str) -> bool {
    !value.is_empty()
}

/// An absent value always passes.
pub fn max_field(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.chars().count() <= MAX_FIELD_CHARS)
}

fn check_required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if required_field(value) {
        Ok(())
    } else {
        Err(ValidationError::Missing(field))
    }
}

fn check_max(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if max_field(Some(value)) {
        Ok(())
    } else {
        Err(ValidationError::TooLong(field))
    }
}

fn validate_segment(segment: &Segment) -> Result<(), ValidationError> {
    check_required(&segment.exercise_type_id, "exerciseTypeID")?;
    check_required(&segment.prescription, "prescription")?;
    check_max(&segment.prescription, "prescription")
}

pub fn validate_workout(workout: &Workout) -> Result<(), ValidationError> {
    check_required(&workout.title, "title")?;
    check_max(&workout.title, "title")?;

    if workout.rest_day {
        return Ok(());
    }

    for (i, segment) in workout.segments.iter().enumerate() {
        validate_segment(segment).map_err(|e| e.in_segment(i))?;
    }
    Ok(())
}

pub fn workout_validator(workout: &Workout) -> bool {
    validate_workout(workout).is_ok()
}

fn validate_micro_cycle(cycle: &MicroCycle) -> Result<(), ValidationError> {
    check_required(&cycle.title, "title")?;
    if cycle.span == 0 {
        return Err(ValidationError::MissingSpan);
    }
    if cycle.workouts.len() < cycle.span {
        return Err(ValidationError::NotEnoughWorkouts {
            span: cycle.span,
            workouts: cycle.workouts.len(),
        });
    }
    for (i, workout) in cycle.workouts.iter().enumerate() {
        validate_workout(workout).map_err(|e| e.in_workout(i))?;
    }
    Ok(())
}

fn validate_blocks(blocks: &[Block]) -> Result<(), ValidationError> {
    for (b, block) in blocks.iter().enumerate() {
        check_required(&block.title, "title").map_err(|e| e.in_block(b))?;
        for (m, cycle) in block.micro_cycles.iter().enumerate() {
            validate_micro_cycle(cycle).map_err(|e| e.in_micro_cycle(m).in_block(b))?;
        }
    }
    Ok(())
}

pub fn validate_program(program: &Program) -> Result<(), ValidationError> {
    if *program == Program::default() {
        return Err(ValidationError::EmptyProgram);
    }
    check_required(&program.title, "title")?;
    check_max(&program.title, "title")?;
    validate_blocks(&program.blocks)
}

pub fn program_validator(program: &Program) -> bool {
    validate_program(program).is_ok()
}

/// An instance must name its activity and program in addition to carrying a
/// valid program shape.
pub fn validate_instance(instance: &ProgramInstance) -> Result<(), ValidationError> {
    check_required(&instance.title, "title")?;
    check_max(&instance.title, "title")?;
    check_required(&instance.activity_id, "activityID")?;
    check_required(&instance.program_id, "programID")?;
    validate_blocks(&instance.blocks)
}
