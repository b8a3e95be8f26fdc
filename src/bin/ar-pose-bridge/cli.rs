#[cfg(feature = "tether")]
use std::net::{IpAddr, Ipv4Addr};

use clap::Parser;

// Some defaults; some of which can be overriden via CLI args
const CONFIG_FILE_PATH: &str = "./bridge.json";
const DEFAULT_FOV: f32 = 60.;
const DEFAULT_ASPECT: f32 = 16. / 9.;
#[cfg(feature = "tether")]
const TETHER_HOST: std::net::IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Where to load bridge config
    #[arg(long = "configPath", default_value_t = String::from(CONFIG_FILE_PATH))]
    pub config_path: String,

    /// Write the effective config (defaults included) back to configPath on startup
    #[arg(long = "saveConfig")]
    pub save_config: bool,

    /// JSON-lines event recording to replay; reads stdin if omitted
    #[arg(long = "input")]
    pub input: Option<String>,

    /// Vertical field of view (degrees) the tracker reports before any resize event
    #[arg(long = "camera.fov", default_value_t = DEFAULT_FOV)]
    pub camera_fov: f32,

    /// Aspect ratio the tracker reports before any resize event
    #[arg(long = "camera.aspect", default_value_t = DEFAULT_ASPECT)]
    pub camera_aspect: f32,

    #[arg(long = "loglevel", default_value_t = String::from("info"))]
    pub log_level: String,

    /// Receive tracker events from Tether instead of replaying a recording
    #[cfg(feature = "tether")]
    #[arg(long = "tether")]
    pub use_tether: bool,

    /// The IP address of the MQTT broker (server)
    #[cfg(feature = "tether")]
    #[arg(long = "tether.host", default_value_t = TETHER_HOST)]
    pub tether_host: std::net::IpAddr,

    /// The Agent Role (type)
    #[cfg(feature = "tether")]
    #[arg(long = "tether.role", default_value_t = String::from("arPoseBridge"))]
    pub agent_role: String,

    /// The Agent Group (ID)
    #[cfg(feature = "tether")]
    #[arg(long = "tether.group", default_value_t = String::from("any"))]
    pub agent_group: String,
}
