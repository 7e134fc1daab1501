//! Maps HTTP requests onto a `SimEnv`.
//!
//! Routing is independent of any server crate: the transport hands over
//! method, path and body and writes back the returned status and JSON.

use log::{debug, warn};
use mechanics::Action;
use serde::Serialize;

use crate::error::EnvError;
use crate::protocol::{ErrorResponse, LoadMapRequest, StateResponse, StepRequest, StepResponse};
use crate::sim_env::SimEnv;

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Reply { status, body },
            Err(e) => Reply::error(500, format!("Failed to encode response: {e}")),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let body = ErrorResponse {
            error: message.into(),
        };
        let body = serde_json::to_string(&body).unwrap_or_default();
        Reply { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn handle(env: &mut SimEnv, method: &str, url: &str, body: &str) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    debug!("{method} {path}");
    match (method, path) {
        ("POST", "/reset") => {
            let state = env.reset();
            Reply::json(200, &StepResponse::from_reset(state, env.map_name()))
        }
        ("POST", "/step") => match serde_json::from_str::<StepRequest>(body) {
            Ok(req) => step(env, req),
            Err(e) => Reply::error(400, format!("Invalid step request: {e}")),
        },
        ("POST", "/load_map") => match serde_json::from_str::<LoadMapRequest>(body) {
            Ok(req) => load_map(env, &req.file),
            Err(e) => Reply::error(400, format!("Invalid load_map request: {e}")),
        },
        ("GET", "/state") => {
            let (state, done) = env.state();
            Reply::json(200, &StateResponse { state, done })
        }
        ("GET", "/telemetry") => Reply::json(200, &env.telemetry()),
        _ => Reply::error(404, format!("No route for {method} {path}")),
    }
}

fn step(env: &mut SimEnv, req: StepRequest) -> Reply {
    let (prev, _) = env.state();
    let outcome = match (req.action, req.camera) {
        (Some(index), _) => {
            let result = match req.dt {
                Some(dt) => env.step_with_dt(index, dt),
                None => env.step(index),
            };
            match result {
                Ok(outcome) => outcome,
                Err(e) => return Reply::error(400, e.to_string()),
            }
        }
        (None, Some(angle)) => env.step_action(Action::Camera { angle }, req.dt),
        (None, None) => return Reply::error(400, "Step request needs `action` or `camera`"),
    };
    let reward = env.compute_reward(&prev, &outcome);
    Reply::json(200, &StepResponse::from_outcome(&outcome, reward, env.map_name()))
}

fn load_map(env: &mut SimEnv, reference: &str) -> Reply {
    match env.load_map(reference) {
        Ok(()) => Reply::json(
            200,
            &serde_json::json!({ "status": "ok", "map_name": env.map_name() }),
        ),
        Err(e @ EnvError::Map(world::MapError::NotFound(_))) => Reply::error(404, e.to_string()),
        Err(e) => {
            warn!("load_map {reference:?} failed: {e}");
            Reply::error(500, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::state::StateVector;
    use world::MapModel;

    fn env_with_maps() -> (tempfile::TempDir, SimEnv) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Level2.csv"), "8,8,50,0\nstart,60,60\n").unwrap();
        let map = MapModel::new(10, 10, 50.0, 0.0)
            .with_name("Level1")
            .with_start(100.0, 100.0);
        let env = SimEnv::new(map, SimConfig::default().with_maps_dir(dir.path()));
        (dir, env)
    }

    fn parse<T: serde::de::DeserializeOwned>(reply: &Reply) -> T {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn test_reset_and_step() {
        let (_dir, mut env) = env_with_maps();
        let reply = handle(&mut env, "POST", "/reset", "");
        assert_eq!(reply.status, 200);
        let resp: StepResponse = parse(&reply);
        assert_eq!(resp.state.battery, 1.0);
        assert_eq!(resp.map_name, "Level1");

        let reply = handle(&mut env, "POST", "/step", r#"{"action": 0}"#);
        assert_eq!(reply.status, 200);
        let resp: StepResponse = parse(&reply);
        assert!(!resp.done);
        assert!((resp.reward - -0.1).abs() < 1e-9);
        assert!(resp.state.speed > 0.0);
    }

    #[test]
    fn test_camera_only_step() {
        let (_dir, mut env) = env_with_maps();
        let reply = handle(&mut env, "POST", "/step", r#"{"camera": 45}"#);
        assert_eq!(reply.status, 200);
        assert_eq!(env.sim_state().true_state.camera_angle, 45.0);
    }

    #[test]
    fn test_bad_requests() {
        let (_dir, mut env) = env_with_maps();
        assert_eq!(handle(&mut env, "POST", "/step", "not json").status, 400);
        assert_eq!(handle(&mut env, "POST", "/step", "{}").status, 400);
        assert_eq!(handle(&mut env, "POST", "/step", r#"{"action": 99}"#).status, 400);
        assert_eq!(handle(&mut env, "GET", "/nowhere", "").status, 404);
        assert_eq!(handle(&mut env, "GET", "/step", "").status, 404);
    }

    #[test]
    fn test_load_map_routes() {
        let (_dir, mut env) = env_with_maps();
        let before = env.state();
        let reply = handle(&mut env, "POST", "/load_map", r#"{"file": "Missing.csv"}"#);
        assert_eq!(reply.status, 404);
        let err: ErrorResponse = parse(&reply);
        assert!(err.error.contains("Missing.csv"));
        assert_eq!(env.state(), before);

        let reply = handle(&mut env, "POST", "/load_map", r#"{"file": "Level2"}"#);
        assert!(reply.is_success());
        assert_eq!(env.map_name(), "Level2");
    }

    #[test]
    fn test_state_and_telemetry() {
        let (_dir, mut env) = env_with_maps();
        handle(&mut env, "POST", "/step", r#"{"action": 0}"#);
        let resp: StateResponse = parse(&handle(&mut env, "GET", "/state?verbose=1", ""));
        assert!(!resp.done);
        assert_ne!(resp.state, StateVector::default());

        let value: serde_json::Value = parse(&handle(&mut env, "GET", "/telemetry", ""));
        assert_eq!(value["steps"], 1);
        assert_eq!(value["map_name"], "Level1");
    }
}
