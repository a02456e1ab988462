//! HTTP client for the homegym persistence service.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::dates::{workout_date, SECONDS_PER_DAY};
use crate::error::{ClientError, ClientResult};
use crate::models::{Activity, Coordinates, ExerciseType, Program, ProgramInstance, WorkoutEvent};
use crate::schedule;
use crate::stores::Stores;
use crate::validate::{validate_instance, validate_program};

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct HomegymClient {
    client: Client,
    base_url: Url,
    page_size: usize,
}

impl HomegymClient {
    pub fn new(base_url: &str, page_size: usize) -> ClientResult<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(HomegymClient {
            client,
            base_url: Url::parse(base_url)?,
            page_size: page_size.max(1),
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Appends percent-encoded `segments` to the base URL, keeping any path
    /// prefix it has. An empty last segment gives a trailing slash.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }

    /// Maps 401 to `NotLoggedIn` and any other failure status to `Status`,
    /// carrying the service's `message` when the body has one.
    async fn check(response: Response, action: &str) -> ClientResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::NotLoggedIn(format!("unauthorized {}", action)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            warn!("{} failed: {} - {}", action, status, message);
            return Err(ClientError::Status { status, message });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, action: &str) -> ClientResult<T> {
        let response = self.client.get(url).send().await?;
        let response = Self::check(response, action).await?;
        Ok(response.json::<T>().await?)
    }

    /// POSTs `body` and returns the ID the service assigned when `existing_id` is empty.
    async fn post_for_id<B: Serialize>(
        &self,
        url: Url,
        body: &B,
        existing_id: &str,
        action: &str,
    ) -> ClientResult<String> {
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check(response, action).await?;
        if !existing_id.is_empty() {
            return Ok(existing_id.to_string());
        }
        let created = response.json::<IdResponse>().await?;
        Ok(created.id)
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let url = self.url(&["homegym", "login"])?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::NotLoggedIn(
                "logged in using invalid credentials".to_string(),
            ));
        }
        Self::check(response, "login").await?;
        info!("logged in as {}", username);
        Ok(())
    }

    pub async fn fetch_activities(&self) -> ClientResult<Vec<Activity>> {
        let url = self.url(&["homegym", "api", "activities", ""])?;
        self.get_json(url, "fetch of activities").await
    }

    /// IDs of the exercise types associated with an activity.
    pub async fn fetch_activity_exercises(&self, activity_id: &str) -> ClientResult<Vec<String>> {
        let url = self.url(&["homegym", "api", "activities", activity_id, "exercises", ""])?;
        let ids: Option<Vec<String>> = self.get_json(url, "fetch of activity exercises").await?;
        Ok(ids.unwrap_or_default())
    }

    pub async fn fetch_exercise_types(&self) -> ClientResult<Vec<ExerciseType>> {
        let url = self.url(&["homegym", "api", "exercises", ""])?;
        self.get_json(url, "fetch of exercise types").await
    }

    /// One page of events, newest first, dated at or before `date`
    /// (now when `None`), continuing after `previous_id` when given.
    pub async fn fetch_event_page(
        &self,
        previous_id: Option<&str>,
        date: Option<i64>,
    ) -> ClientResult<Vec<WorkoutEvent>> {
        let mut url = self.url(&["homegym", "api", "events", ""])?;
        let date = date.unwrap_or_else(crate::dates::now_in_seconds);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &self.page_size.to_string());
            if let Some(id) = previous_id.filter(|id| !id.is_empty()) {
                query.append_pair("previousID", id);
            }
            query.append_pair("date", &date.to_string());
        }
        let page: Option<Vec<WorkoutEvent>> = self.get_json(url, "fetch of event page").await?;
        Ok(page.unwrap_or_default())
    }

    /// Events from `start` going back in time until one falls before `end`.
    /// The last page may hold events older than `end`; callers filter.
    pub async fn fetch_events(
        &self,
        previous_id: Option<&str>,
        start: i64,
        end: i64,
    ) -> ClientResult<Vec<WorkoutEvent>> {
        let mut events = Vec::new();
        let mut previous = previous_id.map(str::to_string);
        let mut date = start;

        loop {
            let page = self.fetch_event_page(previous.as_deref(), Some(date)).await?;
            let page_len = page.len();
            let last = page.last().map(|e| (e.id.clone(), e.date));
            events.extend(page);

            match last {
                Some((id, last_date)) if page_len >= self.page_size && last_date >= end => {
                    date = last_date;
                    previous = Some(id);
                }
                _ => break,
            }
        }

        debug!("fetched {} events between {} and {}", events.len(), end, start);
        Ok(events)
    }

    pub async fn fetch_programs(&self, activity_id: &str) -> ClientResult<Vec<Program>> {
        let path = ["homegym", "api", "activities", activity_id, "programs"];
        self.fetch_paged(&path, "fetch of program page", |p: &Program| p.id.clone())
            .await
    }

    pub async fn fetch_program_instances(
        &self,
        activity_id: &str,
        program_id: &str,
    ) -> ClientResult<Vec<ProgramInstance>> {
        let path = [
            "homegym",
            "api",
            "activities",
            activity_id,
            "programs",
            program_id,
            "instances",
        ];
        self.fetch_paged(&path, "fetch of program instance page", |i: &ProgramInstance| {
            i.id.clone()
        })
        .await
    }

    /// Pages through `path` with `size` and `previous` until a short page.
    async fn fetch_paged<T, F>(&self, path: &[&str], action: &str, id_of: F) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> String,
    {
        let mut items = Vec::new();
        let mut previous: Option<String> = None;

        loop {
            let mut url = self.url(path)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("size", &self.page_size.to_string());
                if let Some(id) = &previous {
                    query.append_pair("previous", id);
                }
            }
            let page: Option<Vec<T>> = self.get_json(url, action).await?;
            let page = page.unwrap_or_default();
            let page_len = page.len();
            let last_id = page.last().map(&id_of);
            items.extend(page);

            match last_id {
                Some(id) if page_len >= self.page_size => previous = Some(id),
                _ => break,
            }
        }
        Ok(items)
    }

    /// Active instances of an activity. A 404 means there are none.
    pub async fn fetch_active_program_instances(
        &self,
        activity_id: &str,
    ) -> ClientResult<Vec<ProgramInstance>> {
        let url = self.url(&[
            "homegym",
            "api",
            "activities",
            activity_id,
            "programs",
            "instances",
            "active",
            "",
        ])?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("no active program instances for activity {}", activity_id);
            return Ok(Vec::new());
        }
        let response = Self::check(response, "fetch of active program instances").await?;

        // The service has been seen to return each instance as a JSON string.
        let raw: Option<Vec<Value>> = response.json().await?;
        raw.unwrap_or_default()
            .into_iter()
            .map(|value| {
                let instance: Result<ProgramInstance, serde_json::Error> = match value {
                    Value::String(s) => serde_json::from_str(&s),
                    other => serde_json::from_value(other),
                };
                instance.map_err(|e| ClientError::Decode(e.to_string()))
            })
            .collect()
    }

    /// Stores `program` on the service and returns its ID. A program without
    /// an ID is created and given the ID the service assigned.
    pub async fn update_program(&self, program: &mut Program) -> ClientResult<String> {
        validate_program(program)?;
        if program.activity_id.is_empty() {
            return Err(ClientError::MissingField("activityID"));
        }
        let url = self.url(&[
            "homegym",
            "api",
            "activities",
            program.activity_id.as_str(),
            "programs",
            program.id.as_str(),
        ])?;
        let id = self
            .post_for_id(url, &*program, &program.id, "update of program")
            .await?;
        program.id = id.clone();
        info!("saved program {}", id);
        Ok(id)
    }

    pub async fn update_program_instance(
        &self,
        instance: &mut ProgramInstance,
    ) -> ClientResult<String> {
        validate_instance(instance)?;
        let url = self.url(&[
            "homegym",
            "api",
            "activities",
            instance.activity_id.as_str(),
            "programs",
            instance.program_id.as_str(),
            "instances",
            instance.id.as_str(),
        ])?;
        let id = self
            .post_for_id(url, &*instance, &instance.id, "update of program instance")
            .await?;
        instance.id = id.clone();
        info!("saved program instance {}", id);
        Ok(id)
    }

    pub async fn deactivate_program_instance(
        &self,
        activity_id: &str,
        instance_id: &str,
    ) -> ClientResult<()> {
        let mut url = self.url(&[
            "homegym",
            "api",
            "activities",
            activity_id,
            "programs",
            "instances",
            "active",
        ])?;
        url.query_pairs_mut().append_pair("instanceid", instance_id);
        let response = self.client.delete(url).send().await?;
        Self::check(response, "deactivation of program instance").await?;
        info!("deactivated program instance {}", instance_id);
        Ok(())
    }

    /// Events of the instance's activity logged on the UTC calendar day of
    /// the workout at `coords`.
    pub async fn events_on_workout_day(
        &self,
        instance: &ProgramInstance,
        coords: Coordinates,
    ) -> ClientResult<Vec<WorkoutEvent>> {
        let day = schedule::day_index(instance, coords)?;
        let day_start = workout_date(instance.start_date, day as i64);
        let day_end = day_start + SECONDS_PER_DAY - 1;

        let events = self.fetch_events(None, day_end, day_start).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.date >= day_start && e.date <= day_end)
            .filter(|e| e.activity_id == instance.activity_id)
            .collect())
    }

    /// Loads every activity, with its exercise IDs, and all exercise types into `stores`.
    pub async fn load_catalog(&self, stores: &mut Stores) -> ClientResult<()> {
        for mut activity in self.fetch_activities().await? {
            activity.exercises = self.fetch_activity_exercises(&activity.id).await?;
            stores.activities.add(activity);
        }
        for exercise_type in self.fetch_exercise_types().await? {
            stores.exercise_types.add(exercise_type);
        }
        Ok(())
    }

    /// Loads the activity's programs and active instances into `stores`.
    pub async fn load_activity(&self, stores: &mut Stores, activity_id: &str) -> ClientResult<()> {
        let programs = self.fetch_programs(activity_id).await?;
        let active = self.fetch_active_program_instances(activity_id).await?;
        info!(
            "activity {}: {} programs, {} active instances",
            activity_id,
            programs.len(),
            active.len()
        );
        stores.programs.add_bulk(programs);
        stores.instances.add_all_active(activity_id, active);
        Ok(())
    }
}
