//! Plain-text renderings of an instance: a per-day schedule table and a
//! markdown status brief.

use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dates::{date_from_seconds, format_date, workout_date};
use crate::models::ProgramInstance;
use crate::schedule::{program_length, schedule_days, workout_at};
use crate::status::{today_index_at, workout_status, InstanceStatus, WorkoutStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub day: usize,
    pub date: String,
    pub block: usize,
    pub micro_cycle: usize,
    pub workout: usize,
    pub title: String,
    pub rest_day: bool,
    pub event_id: Option<String>,
    pub status: WorkoutStatus,
}

/// One row per program day, with each workout's status as of `now`.
pub fn schedule_rows(instance: &ProgramInstance, now: DateTime<Utc>) -> Vec<ScheduleRow> {
    let today = today_index_at(instance, now);

    schedule_days(instance)
        .map(|day| {
            let event_id = instance.event_for_day(day.day_index);
            let rest_day = day.is_rest_day();
            let date = date_from_seconds(Some(workout_date(
                instance.start_date,
                day.day_index as i64,
            )));
            ScheduleRow {
                day: day.day_index,
                date: format_date(&date),
                block: day.coords.block(),
                micro_cycle: day.coords.micro_cycle(),
                workout: day.coords.workout(),
                title: day.workout.map(|w| w.title.clone()).unwrap_or_default(),
                rest_day,
                event_id: event_id.map(str::to_string),
                status: workout_status(event_id, day.day_index as i64, today, rest_day),
            }
        })
        .collect()
}

pub fn write_schedule_csv<W: io::Write>(rows: &[ScheduleRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn status_brief(
    instance: &ProgramInstance,
    status: &InstanceStatus,
    now: DateTime<Utc>,
) -> String {
    let mut brief = String::new();

    brief.push_str(&format!("# {}\n\n", instance.title));
    brief.push_str(&format!("**Today**: {}\n", format_date(&now)));
    brief.push_str(&format!(
        "**Started**: {}\n",
        format_date(&date_from_seconds(Some(instance.start_date)))
    ));
    brief.push_str(&format!("**Length**: {} days\n\n", program_length(instance)));

    brief.push_str("## Progress\n");
    brief.push_str(&format!("- **Complete**: {}%\n", status.percent_complete));
    brief.push_str(&format!("- **Adherence**: {}%\n", status.adherence));
    match status.day_index {
        Some(day) if day < 0 => brief.push_str(&format!("- Starts in {} days.\n", -day)),
        Some(day) => brief.push_str(&format!("- Day {}\n", day + 1)),
        None => brief.push_str("- Program finished.\n"),
    }
    brief.push('\n');

    brief.push_str("## Today's Workout\n");
    let workout = status.coords.and_then(|c| workout_at(instance, c));
    match (status.coords, workout) {
        (Some(coords), Some(w)) if w.rest_day => {
            brief.push_str(&format!("- **{}** {} (rest day)\n", w.title, coords));
        }
        (Some(coords), Some(w)) => {
            brief.push_str(&format!("- **{}** {}\n", w.title, coords));
            if let Some(desc) = &w.description {
                brief.push_str(&format!("  {}\n", desc));
            }
            for segment in &w.segments {
                brief.push_str(&format!(
                    "  - {}: {}\n",
                    segment.exercise_type_id, segment.prescription
                ));
            }
        }
        _ => brief.push_str("- None scheduled.\n"),
    }

    brief
}
