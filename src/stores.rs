//! In-memory caches of entities fetched from the persistence service.
//!
//! The caches are plain values owned by the caller and handed to the status
//! and selection functions, so nothing here is global.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::{Activity, ExerciseType, Program, ProgramInstance, Workout, WorkoutEvent};
use crate::schedule;

#[derive(Debug, Default, Clone)]
pub struct ActivityStore {
    activities: HashMap<String, Activity>,
}

impl ActivityStore {
    pub fn add(&mut self, activity: Activity) {
        self.activities.insert(activity.id.clone(), activity);
    }

    pub fn get(&self, activity_id: &str) -> Option<&Activity> {
        self.activities.get(activity_id)
    }

    pub fn get_mut(&mut self, activity_id: &str) -> Option<&mut Activity> {
        self.activities.get_mut(activity_id)
    }

    pub fn all(&self) -> Vec<&Activity> {
        self.activities.values().collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExerciseTypeStore {
    exercise_types: HashMap<String, ExerciseType>,
}

impl ExerciseTypeStore {
    pub fn add(&mut self, exercise_type: ExerciseType) {
        self.exercise_types.insert(exercise_type.id.clone(), exercise_type);
    }

    pub fn get(&self, exercise_type_id: &str) -> Option<&ExerciseType> {
        self.exercise_types.get(exercise_type_id)
    }

    pub fn all(&self) -> Vec<&ExerciseType> {
        self.exercise_types.values().collect()
    }
}

/// Programs keyed by activity ID, then by program ID.
#[derive(Debug, Default, Clone)]
pub struct ProgramStore {
    programs: HashMap<String, HashMap<String, Program>>,
}

impl ProgramStore {
    pub fn add(&mut self, program: Program) {
        self.programs
            .entry(program.activity_id.clone())
            .or_default()
            .insert(program.id.clone(), program);
    }

    pub fn add_bulk(&mut self, programs: impl IntoIterator<Item = Program>) {
        for program in programs {
            self.add(program);
        }
    }

    pub fn get(&self, activity_id: &str, program_id: &str) -> Option<&Program> {
        self.programs.get(activity_id)?.get(program_id)
    }

    /// `None` when nothing has been fetched for the activity yet.
    pub fn by_activity(&self, activity_id: &str) -> Option<Vec<&Program>> {
        self.programs
            .get(activity_id)
            .map(|programs| programs.values().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRef {
    program_id: String,
    instance_id: String,
}

/// Program instances keyed by program ID, then by instance ID, plus the set
/// of instances each activity has started but not yet finished.
#[derive(Debug, Default, Clone)]
pub struct ProgramInstanceStore {
    instances: HashMap<String, HashMap<String, ProgramInstance>>,
    active: HashMap<String, Vec<ActiveRef>>,
}

impl ProgramInstanceStore {
    pub fn add(&mut self, instance: ProgramInstance) {
        self.instances
            .entry(instance.program_id.clone())
            .or_default()
            .insert(instance.id.clone(), instance);
    }

    pub fn add_bulk(&mut self, instances: impl IntoIterator<Item = ProgramInstance>) {
        for instance in instances {
            self.add(instance);
        }
    }

    /// Looks up an instance; without a program ID every program is searched.
    pub fn get(&self, instance_id: &str, program_id: Option<&str>) -> Option<&ProgramInstance> {
        match program_id {
            Some(program_id) => self.instances.get(program_id)?.get(instance_id),
            None => self
                .instances
                .values()
                .find_map(|by_id| by_id.get(instance_id)),
        }
    }

    pub fn by_program(&self, program_id: &str) -> Option<Vec<&ProgramInstance>> {
        let found = self.instances.get(program_id).map(|by_id| by_id.values().collect());
        if found.is_none() {
            tracing::debug!("instances of program {} not yet added", program_id);
        }
        found
    }

    /// Makes `instance` the only active instance of the activity. `None`
    /// records that the activity has no active instance.
    pub fn set_active(&mut self, activity_id: &str, instance: Option<ProgramInstance>) {
        match instance {
            Some(instance) => {
                let active = ActiveRef {
                    program_id: instance.program_id.clone(),
                    instance_id: instance.id.clone(),
                };
                self.active.insert(activity_id.to_string(), vec![active]);
                self.add(instance);
            }
            None => {
                self.active.insert(activity_id.to_string(), Vec::new());
            }
        }
    }

    /// Replaces the active set of the activity with `instances`, keeping their order.
    pub fn add_all_active(
        &mut self,
        activity_id: &str,
        instances: impl IntoIterator<Item = ProgramInstance>,
    ) {
        let mut refs = Vec::new();
        for instance in instances {
            refs.push(ActiveRef {
                program_id: instance.program_id.clone(),
                instance_id: instance.id.clone(),
            });
            self.add(instance);
        }
        self.active.insert(activity_id.to_string(), refs);
    }

    /// All active instances of the activity, in the order they were added.
    pub fn active_instances(&self, activity_id: &str) -> Vec<&ProgramInstance> {
        self.active
            .get(activity_id)
            .map(|refs| {
                refs.iter()
                    .filter_map(|r| self.get(&r.instance_id, Some(&r.program_id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first active instance of the activity, if any.
    pub fn active(&self, activity_id: &str) -> Option<&ProgramInstance> {
        self.active_instances(activity_id).into_iter().next()
    }

    /// Drops one instance from the active set, or the whole set when `instance_id` is `None`.
    pub fn remove_active(&mut self, activity_id: &str, instance_id: Option<&str>) {
        if let Some(refs) = self.active.get_mut(activity_id) {
            match instance_id {
                Some(id) => refs.retain(|r| r.instance_id != id),
                None => refs.clear(),
            }
        }
    }

    /// Workouts of the activity's active instance in program order.
    pub fn active_workouts(&self, activity_id: &str) -> Vec<&Workout> {
        self.active(activity_id)
            .map(|instance| schedule::workouts(instance).collect())
            .unwrap_or_default()
    }
}

/// Fetched workout events, in the order the service returned them.
#[derive(Debug, Default, Clone)]
pub struct EventStore {
    events: Vec<WorkoutEvent>,
    page_size: usize,
}

impl EventStore {
    pub fn new(page_size: usize) -> Self {
        EventStore {
            events: Vec::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn add(&mut self, event: WorkoutEvent) {
        self.events.push(event);
    }

    pub fn add_bulk(&mut self, events: impl IntoIterator<Item = WorkoutEvent>) {
        self.events.extend(events);
    }

    pub fn update(&mut self, event: WorkoutEvent) -> Result<(), StoreError> {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => {
                *existing = event;
                Ok(())
            }
            None => Err(StoreError::EventNotFound(event.id)),
        }
    }

    pub fn last(&self) -> Option<&WorkoutEvent> {
        self.events.last()
    }

    pub fn by_id(&self, event_id: &str) -> Option<&WorkoutEvent> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn page(&self, page_number: usize) -> &[WorkoutEvent] {
        let size = self.page_size.max(1);
        let start = (page_number * size).min(self.events.len());
        let end = (start + size).min(self.events.len());
        &self.events[start..end]
    }

    pub fn all(&self) -> &[WorkoutEvent] {
        &self.events
    }
}

/// All client-side caches together.
#[derive(Debug, Default, Clone)]
pub struct Stores {
    pub activities: ActivityStore,
    pub exercise_types: ExerciseTypeStore,
    pub programs: ProgramStore,
    pub instances: ProgramInstanceStore,
    pub events: EventStore,
}

impl Stores {
    pub fn new(page_size: usize) -> Self {
        Stores {
            events: EventStore::new(page_size),
            ..Default::default()
        }
    }
}
