//! Where an instance stands today: the current workout, how much of the
//! program has elapsed and how many of the due workouts were performed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dates::{midnight, SECONDS_PER_DAY};
use crate::models::{Coordinates, ProgramInstance};
use crate::schedule::{program_length, schedule_days, workout_coords};
use crate::stores::ProgramInstanceStore;

/// Display status of one planned workout. Recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkoutStatus {
    Future,
    Missed,
    Done,
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Future => "FUTURE",
            Self::Missed => "MISSED",
            Self::Done => "DONE",
        };
        write!(f, "{}", s)
    }
}

pub fn workout_status(
    event_id: Option<&str>,
    workout_index: i64,
    today_index: i64,
    is_rest_day: bool,
) -> WorkoutStatus {
    if event_id.is_some_and(|id| !id.is_empty()) {
        WorkoutStatus::Done
    } else if workout_index >= today_index {
        WorkoutStatus::Future
    } else if is_rest_day {
        WorkoutStatus::Done
    } else {
        WorkoutStatus::Missed
    }
}

/// Whole days between the instance's start date and `now`. Negative before
/// the instance starts, and past the program length once it has finished.
pub fn today_index_at(instance: &ProgramInstance, now: DateTime<Utc>) -> i64 {
    (now.timestamp() - midnight(instance.start_date)).div_euclid(SECONDS_PER_DAY)
}

pub fn today_index(instance: &ProgramInstance) -> i64 {
    today_index_at(instance, Utc::now())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub percent_complete: u32,
    pub adherence: u32,
    /// Today's workout; `None` before the start and after the last day.
    pub coords: Option<Coordinates>,
    /// `None` once the program has fully elapsed.
    pub day_index: Option<i64>,
}

impl InstanceStatus {
    pub fn is_complete(&self) -> bool {
        self.day_index.is_none()
    }
}

/// Percentage of `due` workouts covered by `performed`, floored and capped at 100.
/// Nothing due counts as full adherence.
fn adherence_percent(performed: usize, due: i64) -> u32 {
    if due <= 0 {
        warn!(performed, due, "no workouts due yet, reporting full adherence");
        return 100;
    }
    ((performed as i64 * 100) / due).min(100) as u32
}

/// Status of `instance` as of `now`.
///
/// The instance counts as complete from day `program_length` onward, one
/// day earlier than a strict `day > length` test would. Day `program_length`
/// has no workout coordinates, so it reports 100% complete with adherence
/// over the whole program rather than a partial day.
pub fn instance_status_at(instance: &ProgramInstance, now: DateTime<Utc>) -> InstanceStatus {
    let day = today_index_at(instance, now);
    let length = program_length(instance);

    if day < 0 {
        debug!(instance = %instance.id, day, "instance has not started");
        return InstanceStatus {
            percent_complete: 0,
            adherence: 100,
            coords: None,
            day_index: Some(day),
        };
    }

    let today = day as usize;
    let rest_days = schedule_days(instance)
        .take_while(|d| d.day_index <= today)
        .filter(|d| d.is_rest_day())
        .count();
    let performed = instance
        .events
        .keys()
        .filter(|&&k| k <= today && instance.event_for_day(k).is_some())
        .count();

    debug!(
        instance = %instance.id,
        day, length, rest_days, performed,
        "computing instance status"
    );

    if today >= length {
        return InstanceStatus {
            percent_complete: 100,
            adherence: adherence_percent(performed, length as i64 - rest_days as i64),
            coords: None,
            day_index: None,
        };
    }

    InstanceStatus {
        percent_complete: (today * 100 / length) as u32,
        adherence: adherence_percent(performed, day + 1 - rest_days as i64),
        coords: workout_coords(instance, today).ok(),
        day_index: Some(day),
    }
}

/// Status of a cached instance as of `now`; `None` when it is not cached.
pub fn program_instance_status_at(
    store: &ProgramInstanceStore,
    instance_id: &str,
    now: DateTime<Utc>,
) -> Option<InstanceStatus> {
    let Some(instance) = store.get(instance_id, None) else {
        debug!(instance = instance_id, "instance not found");
        return None;
    };
    Some(instance_status_at(instance, now))
}

pub fn program_instance_status(
    store: &ProgramInstanceStore,
    instance_id: &str,
) -> Option<InstanceStatus> {
    program_instance_status_at(store, instance_id, Utc::now())
}

/// The activity's current instance: the active instance with the earliest
/// start date, provided that date is not in the future. Equal start dates
/// are settled by the lowest instance ID.
pub fn select_current_instance_at<'a>(
    store: &'a ProgramInstanceStore,
    activity_id: &str,
    now: DateTime<Utc>,
) -> Option<&'a ProgramInstance> {
    let earliest = store
        .active_instances(activity_id)
        .into_iter()
        .min_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)))?;

    if earliest.start_date > now.timestamp() {
        debug!(
            activity = activity_id,
            instance = %earliest.id,
            "earliest active instance starts in the future"
        );
        return None;
    }

    debug!(activity = activity_id, instance = %earliest.id, "selected current instance");
    Some(earliest)
}

pub fn select_current_instance<'a>(
    store: &'a ProgramInstanceStore,
    activity_id: &str,
) -> Option<&'a ProgramInstance> {
    select_current_instance_at(store, activity_id, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Block;
    use crate::schedule::tests::{cycle, test_program};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 26, 15, 30, 0).unwrap()
    }

    fn started_days_ago(days: i64) -> ProgramInstance {
        let start = (now() - Duration::days(days)).timestamp();
        let mut instance = ProgramInstance::from_program(&test_program(), start);
        instance.id = "test-program-instance-id".to_string();
        instance
    }

    fn with_events(
        mut instance: ProgramInstance,
        days: impl IntoIterator<Item = usize>,
    ) -> ProgramInstance {
        for d in days {
            instance.events.insert(d, format!("event-{}", d));
        }
        instance
    }

    #[test]
    fn event_marks_workout_done() {
        assert_eq!(workout_status(Some("evt"), 5, 10, false), WorkoutStatus::Done);
        assert_eq!(workout_status(Some("evt"), 12, 10, false), WorkoutStatus::Done);
    }

    #[test]
    fn unlogged_workouts_are_future_or_missed() {
        assert_eq!(workout_status(None, 10, 10, false), WorkoutStatus::Future);
        assert_eq!(workout_status(Some(""), 11, 10, false), WorkoutStatus::Future);
        assert_eq!(workout_status(None, 9, 10, false), WorkoutStatus::Missed);
        assert_eq!(workout_status(Some(""), 9, 10, false), WorkoutStatus::Missed);
    }

    #[test]
    fn past_rest_days_are_done() {
        assert_eq!(workout_status(None, 3, 10, true), WorkoutStatus::Done);
        assert_eq!(workout_status(None, 12, 10, true), WorkoutStatus::Future);
    }

    #[test]
    fn today_index_counts_from_start_midnight() {
        let instance = started_days_ago(16);
        assert_eq!(today_index_at(&instance, now()), 16);

        let mut late_start = instance.clone();
        late_start.start_date = (now() + Duration::hours(1)).timestamp();
        assert_eq!(today_index_at(&late_start, now()), 0);

        let mut future = instance;
        future.start_date = (now() + Duration::days(3)).timestamp();
        assert_eq!(today_index_at(&future, now()), -3);
    }

    #[test]
    fn status_mid_program() {
        let logged = [0, 1, 2, 3, 5, 6, 7, 8, 9, 10, 12, 13, 14, 15];
        let instance = with_events(started_days_ago(16), logged);
        let status = instance_status_at(&instance, now());

        assert_eq!(status.percent_complete, 38);
        // 14 of the 17 days up to and including today
        assert_eq!(status.adherence, 82);
        assert_eq!(status.coords, Some(Coordinates(1, 0, 2)));
        assert_eq!(status.day_index, Some(16));
        assert!(!status.is_complete());
    }

    #[test]
    fn status_counts_only_non_empty_events_up_to_today() {
        let mut instance = with_events(started_days_ago(15), 0..14);
        instance.events.insert(14, String::new());
        instance.events.insert(30, "future-log".to_string());
        let status = instance_status_at(&instance, now());

        assert_eq!(status.percent_complete, 35);
        assert_eq!(status.adherence, 87);
        assert_eq!(status.coords, Some(Coordinates(1, 0, 1)));
    }

    #[test]
    fn rest_days_reduce_the_denominator() {
        let mut instance = started_days_ago(6);
        instance.blocks[0].micro_cycles[0] = cycle(7, &[2, 5]);
        let instance = with_events(instance, [0, 1, 3, 4]);

        let status = instance_status_at(&instance, now());
        assert_eq!(status.adherence, 80);
    }

    #[test]
    fn elapsed_program_is_complete() {
        let instance = with_events(started_days_ago(50), 0..21);
        let status = instance_status_at(&instance, now());

        assert_eq!(status.percent_complete, 100);
        assert_eq!(status.adherence, 50);
        assert_eq!(status.coords, None);
        assert_eq!(status.day_index, None);
        assert!(status.is_complete());
    }

    #[test]
    fn day_after_last_workout_is_complete() {
        let status = instance_status_at(&with_events(started_days_ago(42), 0..42), now());
        assert_eq!(status.percent_complete, 100);
        assert_eq!(status.adherence, 100);
        assert_eq!(status.day_index, None);
    }

    #[test]
    fn adherence_on_day_length_covers_whole_program() {
        let status = instance_status_at(&with_events(started_days_ago(42), 0..41), now());
        // 41 of 42 program days, not 41 of 43 elapsed days
        assert_eq!(status.adherence, 97);
        assert_eq!(status.coords, None);
        assert_eq!(status.day_index, None);

        let last_day = instance_status_at(&with_events(started_days_ago(41), 0..41), now());
        assert_eq!(last_day.day_index, Some(41));
        assert_eq!(last_day.coords, Some(Coordinates(2, 1, 6)));
        assert_eq!(last_day.percent_complete, 97);
    }

    #[test]
    fn instance_not_started_yet() {
        let status = instance_status_at(&started_days_ago(-2), now());
        assert_eq!(status.percent_complete, 0);
        assert_eq!(status.adherence, 100);
        assert_eq!(status.coords, None);
        assert_eq!(status.day_index, Some(-2));
    }

    #[test]
    fn all_rest_days_so_far_is_full_adherence() {
        let mut instance = started_days_ago(1);
        instance.blocks[0].micro_cycles[0] = cycle(7, &[0, 1]);
        assert_eq!(instance_status_at(&instance, now()).adherence, 100);
    }

    #[test]
    fn events_on_rest_days_never_push_adherence_past_100() {
        let mut instance = started_days_ago(3);
        instance.blocks[0].micro_cycles[0] = cycle(7, &[1, 3]);
        let instance = with_events(instance, 0..4);
        assert_eq!(instance_status_at(&instance, now()).adherence, 100);
    }

    #[test]
    fn empty_program_is_complete_from_day_zero() {
        let mut instance = started_days_ago(0);
        instance.blocks = Vec::<Block>::new();
        let status = instance_status_at(&instance, now());
        assert_eq!(status.percent_complete, 100);
        assert_eq!(status.adherence, 100);
        assert!(status.is_complete());
    }

    #[test]
    fn status_by_id_reads_the_store() {
        let mut store = ProgramInstanceStore::default();
        let instance = started_days_ago(16);
        store.add(instance.clone());

        assert_eq!(
            program_instance_status_at(&store, &instance.id, now()),
            Some(instance_status_at(&instance, now()))
        );
        assert_eq!(program_instance_status_at(&store, "unknown", now()), None);
    }

    fn active_instance(id: &str, start: DateTime<Utc>) -> ProgramInstance {
        let mut instance = ProgramInstance::from_program(&test_program(), start.timestamp());
        instance.id = id.to_string();
        instance
    }

    #[test]
    fn selects_earliest_started_instance() {
        let mut store = ProgramInstanceStore::default();
        store.add_all_active(
            "test-activity-id",
            [
                active_instance("inst1", now() + Duration::days(1)),
                active_instance("inst2", now() - Duration::days(1)),
                active_instance("inst3", now()),
            ],
        );

        let current = select_current_instance_at(&store, "test-activity-id", now());
        assert_eq!(current.map(|i| i.id.as_str()), Some("inst2"));
    }

    #[test]
    fn future_only_instances_are_not_current() {
        let mut store = ProgramInstanceStore::default();
        store.add_all_active(
            "test-activity-id",
            [
                active_instance("inst1", now() + Duration::days(1)),
                active_instance("inst2", now() + Duration::seconds(1)),
            ],
        );
        assert!(select_current_instance_at(&store, "test-activity-id", now()).is_none());
        assert!(select_current_instance_at(&store, "other-activity", now()).is_none());
    }

    #[test]
    fn equal_start_dates_pick_lowest_id() {
        let mut store = ProgramInstanceStore::default();
        let start = now() - Duration::days(3);
        store.add_all_active(
            "test-activity-id",
            [active_instance("b", start), active_instance("a", start), active_instance("c", start)],
        );
        let current = select_current_instance_at(&store, "test-activity-id", now());
        assert_eq!(current.map(|i| i.id.as_str()), Some("a"));
    }

    #[test]
    fn status_serializes_for_the_ui() {
        let json = serde_json::to_value(WorkoutStatus::Missed).unwrap();
        assert_eq!(json, "MISSED");
        assert_eq!(WorkoutStatus::Done.to_string(), "DONE");
    }
}
