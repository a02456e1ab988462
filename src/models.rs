use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseType {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub intensity_type: String,
    pub volume_type: String,
    #[serde(default)]
    pub volume_constraint: i32,
    #[serde(default)]
    pub composition: Option<serde_json::Value>,
    #[serde(default)]
    pub basis: String,
}

/// Position of one workout inside a program: block, microcycle and workout index.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinates(pub usize, pub usize, pub usize);

impl Coordinates {
    pub fn block(&self) -> usize {
        self.0
    }

    pub fn micro_cycle(&self) -> usize {
        self.1
    }

    pub fn workout(&self) -> usize {
        self.2
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0, self.1, self.2)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(rename = "exerciseTypeID", default)]
    pub exercise_type_id: String,
    #[serde(default)]
    pub prescription: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rest_day: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MicroCycle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub span: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workouts: Vec<Workout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub micro_cycles: Vec<MicroCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A reusable training plan, independent of any calendar date.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Program {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "activityID", default)]
    pub activity_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
}

/// A program bound to a start date. `events` maps day indices to the ID of
/// the workout event that performed that day's workout.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProgramInstance {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "programID", default)]
    pub program_id: String,
    #[serde(rename = "activityID", default)]
    pub activity_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
    #[serde(rename = "startDate", default)]
    pub start_date: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub complete: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: HashMap<usize, String>,
}

impl ProgramInstance {
    /// Starts a new, unsaved instance of `program`. The block structure is
    /// copied so later edits to the program leave the instance untouched.
    pub fn from_program(program: &Program, start_date: i64) -> Self {
        ProgramInstance {
            id: String::new(),
            program_id: program.id.clone(),
            activity_id: program.activity_id.clone(),
            title: program.title.clone(),
            blocks: program.blocks.clone(),
            start_date,
            complete: false,
            events: HashMap::new(),
        }
    }

    /// The event recorded for `day`, ignoring empty placeholders.
    pub fn event_for_day(&self, day: usize) -> Option<&str> {
        self.events
            .get(&day)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Anything laid out as blocks of microcycles of workouts.
pub trait ProgramShape {
    fn blocks(&self) -> &[Block];
}

impl ProgramShape for Program {
    fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl ProgramShape for ProgramInstance {
    fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl ProgramShape for [Block] {
    fn blocks(&self) -> &[Block] {
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ExercisePart {
    #[serde(default)]
    pub intensity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ExerciseInstance {
    #[serde(rename = "typeID")]
    pub type_id: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<ExercisePart>,
}

/// A logged training session.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WorkoutEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "activityID")]
    pub activity_id: String,
    pub date: i64,
    #[serde(default)]
    pub mood: i32,
    #[serde(default)]
    pub motivation: i32,
    #[serde(default)]
    pub energy: i32,
    #[serde(default)]
    pub overall: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: HashMap<usize, ExerciseInstance>,
}
