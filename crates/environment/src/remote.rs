//! Client for a simulator served over HTTP.
//!
//! Connectivity failures never surface to the trainer: they are logged and
//! replaced by a zeroed observation, so callers must tolerate all-zero
//! states after a network hiccup.

use std::time::Duration;

use log::warn;
use mechanics::ActionSpace;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use world::MapError;

use crate::error::{EnvError, Result};
use crate::protocol::{LoadMapRequest, StateResponse, StepRequest, StepResponse};
use crate::sim_env::StepOutcome;
use crate::state::StateVector;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RemoteEnv {
    base_url: String,
    http: Client,
    action_space: ActionSpace,
    last: StepResponse,
}

impl RemoteEnv {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EnvError::Remote(format!("Failed to build HTTP client: {e}")))?;
        Ok(RemoteEnv {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            action_space: ActionSpace::default(),
            last: StepResponse::default(),
        })
    }

    pub fn with_action_space(mut self, action_space: ActionSpace) -> Self {
        self.action_space = action_space;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn action_size(&self) -> usize {
        self.action_space.size()
    }

    pub fn reset(&mut self) -> StateVector {
        self.last = self.post_or_default("/reset", &serde_json::json!({}));
        self.last.state
    }

    pub fn step(&mut self, index: usize) -> Result<StepOutcome> {
        let size = self.action_space.size();
        if index >= size {
            return Err(EnvError::InvalidAction { index, size });
        }
        self.last = self.post_or_default("/step", &StepRequest::action(index));
        Ok(self.last.to_outcome())
    }

    /// Last observation the server reported.
    pub fn state(&self) -> (StateVector, bool) {
        (self.last.state, self.last.done)
    }

    /// Fetches the server's current observation.
    pub fn refresh_state(&mut self) -> (StateVector, bool) {
        let url = format!("{}/state", self.base_url);
        let fetched = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<StateResponse>());
        match fetched {
            Ok(resp) => {
                self.last.state = resp.state;
                self.last.done = resp.done;
            }
            Err(e) => warn!("Remote state unavailable: {e}"),
        }
        self.state()
    }

    /// The server computes rewards; this is the one it sent with the last step.
    pub fn last_reward(&self) -> f64 {
        self.last.reward
    }

    pub fn map_name(&self) -> &str {
        &self.last.map_name
    }

    pub fn load_map(&mut self, reference: &str) -> Result<()> {
        let url = format!("{}/load_map", self.base_url);
        let body = LoadMapRequest {
            file: reference.to_string(),
        };
        match self.http.post(url).json(&body).send() {
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => {
                Err(MapError::NotFound(reference.to_string()).into())
            }
            Ok(resp) if !resp.status().is_success() => {
                let status = resp.status();
                let text = resp.text().unwrap_or_default();
                Err(EnvError::Remote(format!("load_map failed status={status} body={text}")))
            }
            Ok(_) => {
                self.last = StepResponse::default();
                Ok(())
            }
            Err(e) => {
                warn!("Remote load_map {reference:?} not delivered: {e}");
                Ok(())
            }
        }
    }

    fn post_or_default<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> StepResponse {
        self.post(path, body).unwrap_or_else(|e| {
            warn!("Remote {path} failed, using zeroed state: {e}");
            StepResponse::default()
        })
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        self.http.post(url).json(body).send()?.error_for_status()?.json()
    }
}
