//! handpadd - handheld controller to virtual gamepad service

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use handpad_controller::{Controller, ControllerKind};
use handpad_hid_common::Transport;
use handpad_service::{
    ConfigFormat, HandpadService, LogFormat, LoopbackBus, ServiceConfig, ServiceContext,
    init_logging,
};
use handpad_targets::shared;
use tokio::runtime::Handle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// XUSB-style gamepad
    Xinput,
    /// Generic HID joystick
    Dinput,
    /// Steam Deck controller
    Neptune,
}

impl From<SourceKind> for ControllerKind {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Xinput => ControllerKind::XInput,
            SourceKind::Dinput => ControllerKind::DInput,
            SourceKind::Neptune => ControllerKind::Neptune,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "handpadd")]
#[command(about = "Expose a handheld's built-in controller as a virtual gamepad")]
#[command(version)]
struct Cli {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "HANDPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Report format of the physical controller
    #[arg(long, value_enum, default_value_t = SourceKind::Xinput)]
    kind: SourceKind,

    /// USB vendor id of the physical controller, hex
    #[arg(long, value_parser = parse_hex_u16)]
    vid: Option<u16>,

    /// USB product id of the physical controller, hex
    #[arg(long, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    /// Drive the pipeline from a simulated idle controller
    #[arg(long)]
    simulate: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Compact single-line log output
    #[arg(long)]
    compact: bool,
}

fn parse_hex_u16(value: &str) -> Result<u16, std::num::ParseIntError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16)
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            info!("no config file given, using defaults");
            Ok(ServiceConfig::default())
        }
    }
}

fn simulated_transport(kind: ControllerKind) -> Box<dyn Transport> {
    let transport = handpad_hid_common::mock::MockTransport::new(0, 0);
    transport.set_idle_report(vec![0u8; kind.decoder().report_len()]);
    Box::new(transport)
}

#[cfg(feature = "hidapi")]
fn open_transport(cli: &Cli) -> Result<Box<dyn Transport>> {
    let (Some(vid), Some(pid)) = (cli.vid, cli.pid) else {
        anyhow::bail!("--vid and --pid are required unless --simulate is given");
    };
    let transport = handpad_hid_common::HidApiTransport::open(vid, pid)
        .with_context(|| format!("Failed to open controller {vid:04X}:{pid:04X}"))?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "hidapi"))]
fn open_transport(cli: &Cli) -> Result<Box<dyn Transport>> {
    anyhow::bail!(
        "built without HID support, cannot open {:04X}:{:04X}; rebuild with --features hidapi or pass --simulate",
        cli.vid.unwrap_or_default(),
        cli.pid.unwrap_or_default()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.compact {
        LogFormat::Compact
    } else {
        LogFormat::Pretty
    };
    init_logging("info", format)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting handpadd");

    let config = load_config(&cli)?;
    if cli.print_config {
        print!("{}", config.render(ConfigFormat::Yaml)?);
        return Ok(());
    }

    let ctx = ServiceContext::new(config, shared(LoopbackBus::new()), Handle::current())
        .context("Invalid service configuration")?;
    warn!("no virtual gamepad driver available, reports go to the loopback bus");

    let kind = ControllerKind::from(cli.kind);
    let transport = if cli.simulate {
        simulated_transport(kind)
    } else {
        open_transport(&cli)?
    };
    let controller = Controller::new(kind, transport, ctx.config().controller);

    let mut service = HandpadService::new(ctx);
    service
        .attach(controller)
        .context("Failed to attach controller")?;

    service
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "ctrl-c handler failed, shutting down");
            }
        })
        .await
        .context("Tick timer failed")?;

    Ok(())
}
