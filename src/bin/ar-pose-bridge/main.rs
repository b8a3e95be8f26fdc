use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info, warn};

use ar_pose_bridge::{
    bridge_config::{BridgeConfig, load_config_from_file},
    events::SceneUpdate,
    session::Session,
    tracking::{CameraParameters, ReplayTracker},
};
use cli::Cli;

mod cli;
mod replay;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("paho_mqtt", log::LevelFilter::Warn)
        .filter_module("tether_agent", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let config = load_config_from_file(&cli.config_path)?;
    if cli.save_config {
        config.write_config_to_file(&cli.config_path)?;
    }

    let tracker = ReplayTracker::new(CameraParameters::new(cli.camera_fov, cli.camera_aspect));

    #[cfg(feature = "tether")]
    if cli.use_tether {
        return tether_loop::run(&cli, config, tracker);
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open recording {}", path))?,
        )),
        None => {
            info!("No --input given; reading events from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    replay_events(reader, config, tracker, &mut io::stdout().lock())
}

/// Feed every recorded event through a session, writing each resulting
/// scene update as one JSON line.
fn replay_events(
    reader: impl BufRead,
    config: BridgeConfig,
    mut tracker: ReplayTracker,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = Session::init(config, &tracker)?;
    write_update(out, &session.scene_setup())?;
    write_update(
        out,
        &SceneUpdate::ProjectionChanged(*session.render_camera().projection()),
    )?;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let record = match replay::parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping line {}: {}", line_number + 1, e);
                continue;
            }
        };
        let event = match record.into_event(&mut tracker) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping event on line {}: {}", line_number + 1, e);
                continue;
            }
        };

        match session.handle_event(event, &tracker) {
            Ok(updates) => {
                for update in updates.iter() {
                    write_update(out, update)?;
                }
            }
            Err(e) if e.is_recoverable() => {
                // The previous projection stays in place
                error!("Line {}: {}", line_number + 1, e);
            }
            Err(e) => {
                error!("Line {}: {}", line_number + 1, e);
                session.teardown();
                return Err(e.into());
            }
        }
    }

    let summary = session.teardown();
    debug!("Summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}

fn write_update(out: &mut impl Write, update: &SceneUpdate) -> Result<()> {
    serde_json::to_writer(&mut *out, update)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(feature = "tether")]
mod tether_loop {
    use std::thread;
    use std::time::Duration;

    use anyhow::Result;
    use log::{error, info, warn};
    use tether_agent::TetherAgentOptionsBuilder;

    use ar_pose_bridge::{
        bridge_config::BridgeConfig,
        events::TrackerEvent,
        session::Session,
        tether_interface::{
            Inputs, Outputs, decode_camera_parameters, decode_failure, decode_pose,
            decode_target_id, publish_update,
        },
        tracking::ReplayTracker,
    };

    use crate::cli::Cli;

    pub fn run(cli: &Cli, config: BridgeConfig, mut tracker: ReplayTracker) -> Result<()> {
        let tether_agent = TetherAgentOptionsBuilder::new(&cli.agent_role)
            .id(Some(&cli.agent_group))
            .host(Some(&cli.tether_host.to_string()))
            .build()?;

        let inputs = Inputs::new(&tether_agent)?;
        let outputs = Outputs::new(&tether_agent)?;

        let mut session = Session::init(config, &tracker)?;
        publish_update(&tether_agent, &outputs, &session.scene_setup())?;
        tether_agent.encode_and_publish(
            &outputs.projection_output,
            session.render_camera().projection(),
        )?;
        info!("Bridge agent connected; waiting for tracker events");

        loop {
            let Some((topic, message)) = tether_agent.check_messages() else {
                thread::sleep(Duration::from_millis(1));
                continue;
            };
            let payload = message.payload();

            let event = if inputs.pose_input.matches(&topic) {
                decode_pose(payload).map(TrackerEvent::Pose)
            } else if inputs.resize_input.matches(&topic) {
                decode_camera_parameters(payload).map(|camera_parameters| {
                    tracker.set_camera_parameters(camera_parameters);
                    TrackerEvent::Resize
                })
            } else if inputs.detected_input.matches(&topic) {
                decode_target_id(payload).map(TrackerEvent::Detected)
            } else if inputs.lost_input.matches(&topic) {
                decode_target_id(payload).map(TrackerEvent::Lost)
            } else if inputs.asset_loaded_input.matches(&topic) {
                Ok(TrackerEvent::AssetLoaded)
            } else if inputs.frame_input.matches(&topic) {
                Ok(TrackerEvent::Frame)
            } else if inputs.error_input.matches(&topic) {
                decode_failure(payload).map(TrackerEvent::Failed)
            } else {
                continue;
            };

            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!("Dropping undecodable message: {}", e);
                    continue;
                }
            };

            match session.handle_event(event, &tracker) {
                Ok(updates) => {
                    for update in updates.iter() {
                        publish_update(&tether_agent, &outputs, update)?;
                    }
                }
                Err(e) if e.is_recoverable() => error!("{}", e),
                Err(e) => {
                    error!("{}; stopping", e);
                    let summary = session.teardown();
                    info!("Summary: {}", serde_json::to_string(&summary)?);
                    return Err(e.into());
                }
            }
        }
    }
}
