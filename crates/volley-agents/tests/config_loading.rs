// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use anyhow::Result;
use std::time::Duration;
use tempfile::tempdir;
use volley_agents::{ConfigError, EnvConfig, PongEnv};
use volley_infra::loopback;
use volley_io::WireFormat;
use volley_sync::DecodeFailurePolicy;

const BRIDGE_RON: &str = r#"
(
    endpoints: (
        action: "tcp://10.0.0.2:6000",
        state: "tcp://10.0.0.2:6001",
    ),
    wire_format: Bincode,
    max_episode_steps: 250,
    control_hz: 30.0,
    first_snapshot_timeout: Some((secs: 3, nanos: 0)),
    receiver: (
        decode_failure_policy: Invalidate,
    ),
    reward: (
        score_bonus: 5.0,
    ),
    opponent: Some((
        max_speed: 8.0,
        tracking_noise: 0.0,
        seed: Some(42),
    )),
)
"#;

#[test]
fn test_load_config_from_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bridge.ron");
    std::fs::write(&path, BRIDGE_RON)?;

    let config = EnvConfig::load(&path)?;
    config.validate()?;

    assert_eq!(config.endpoints.action, "tcp://10.0.0.2:6000");
    assert_eq!(config.endpoints.state, "tcp://10.0.0.2:6001");
    assert_eq!(config.wire_format, WireFormat::Bincode);
    assert_eq!(config.max_episode_steps, 250);
    assert_eq!(config.first_snapshot_timeout, Some(Duration::from_secs(3)));
    assert_eq!(
        config.receiver.decode_failure_policy,
        DecodeFailurePolicy::Invalidate
    );
    assert!((config.tick_period().as_secs_f32() - 1.0 / 30.0).abs() < 1e-4);

    // Untouched values keep their defaults.
    assert_eq!(config.reward.score_bonus, 5.0);
    assert_eq!(config.reward.concede_penalty, 10.0);
    assert_eq!(config.max_paddle_speed, 15.0);
    assert_eq!(config.slots.primary_id, "paddle1");

    let opponent = config.opponent.as_ref().expect("opponent section");
    assert_eq!(opponent.max_speed, 8.0);
    assert_eq!(opponent.seed, Some(42));
    assert_eq!(opponent.movement_bound, 20.0);

    // The loaded config is accepted as is.
    let (connector, _simulator) = loopback(8);
    let _env = PongEnv::new(config, Box::new(connector))?;
    Ok(())
}

#[test]
fn test_saved_config_loads_back() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("saved.ron");

    let config = EnvConfig::from_ron_str(BRIDGE_RON)?;
    std::fs::write(&path, config.to_ron_string()?)?;

    assert_eq!(EnvConfig::load(&path)?, config);
    Ok(())
}

#[test]
fn test_missing_file_reports_its_path() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.ron");

    match EnvConfig::load(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
    Ok(())
}
