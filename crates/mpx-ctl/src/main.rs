//! mpx-ctl: manage multi-pointer Wayland seats and devices.
//!
//! Similar in spirit to `xinput` for X11 MPX.  Each invocation loads the
//! stored configuration, applies one command, and saves the result when the
//! command changed anything.
//!
//! # Usage
//!
//! ```text
//! mpx-ctl [--config-dir DIR] [--json] [--verbose] <COMMAND>
//!
//! Commands:
//!   list-seats                      List all seats
//!   list-devices                    List all input devices
//!   create-seat <NAME>              Create a new seat
//!   destroy-seat <NAME>             Destroy an empty, non-default seat
//!   register-device <ID> <NAME>     Register a device (--kind K, --vendor HEX --product HEX)
//!   unregister-device <ID>          Forget a device
//!   assign <DEVICE> <SEAT>          Assign a device to a seat
//!   unassign <DEVICE>               Detach a device from its seat
//!   status                          Show a summary
//!   config                          Show the stored configuration
//!   simulate [SCENARIO] [--render]  Run built-in scenarios
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Default                     | Description              |
//! |-------------------|-----------------------------|--------------------------|
//! | `MPX_CONFIG_DIR`  | `~/.config/mpx-wayland`     | Configuration directory  |
//! | `RUST_LOG`        | `warn`                      | Log filter (stderr)      |
//!
//! Failures print `error[<Kind>]: <message>` on stderr and exit with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mpx_core::{Device, DeviceKind};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mpx_ctl::application::simulate::run_simulation;
use mpx_ctl::infrastructure::output::{self, ConfigView};
use mpx_ctl::{ConfigStore, CtlError, SeatController};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Wayland multi-pointer control utility.
#[derive(Debug, Parser)]
#[command(name = "mpx-ctl", version)]
struct Cli {
    /// Override the configuration directory.
    #[arg(long, global = true, env = "MPX_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Registry(RegistryCommand),
    /// Run one built-in scenario, or all of them.
    Simulate {
        scenario: Option<String>,
        /// Draw each scenario's final state.
        #[arg(long)]
        render: bool,
    },
}

/// Commands that load, and possibly save, the stored configuration.
#[derive(Debug, Subcommand)]
enum RegistryCommand {
    /// List all seats.
    ListSeats,
    /// List all input devices and their assignments.
    ListDevices,
    /// Create a new seat.
    CreateSeat { name: String },
    /// Destroy a seat.  The default seat and seats with devices are refused.
    DestroySeat { name: String },
    /// Register a device; USB seat rules or the hot-plug policy decide its seat.
    RegisterDevice {
        id: String,
        name: String,
        #[arg(long, default_value = "pointer")]
        kind: DeviceKind,
        /// USB vendor id in hex, e.g. 046d.
        #[arg(long, value_parser = parse_hex_id, requires = "product")]
        vendor: Option<u16>,
        /// USB product id in hex, e.g. c077.
        #[arg(long, value_parser = parse_hex_id, requires = "vendor")]
        product: Option<u16>,
    },
    /// Forget a device.
    UnregisterDevice { id: String },
    /// Assign a device to a seat.
    Assign { device: String, seat: String },
    /// Detach a device from its seat.
    Unassign { device: String },
    /// Show a summary of seats and devices.
    Status,
    /// Show the stored configuration.
    Config,
}

/// Accepts `046d`, `0x046d` or `0X046D`.
fn parse_hex_id(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{s}' is not a 16-bit hex id: {e}"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json.
    let fallback = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install the log subscriber: {e}"))?;

    match run(cli.command, cli.json, cli.config_dir) {
        Ok(out) => {
            println!("{}", out.trim_end());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Performs one command and returns what to print on stdout.
fn run(command: Command, json: bool, config_dir: Option<PathBuf>) -> Result<String, CtlError> {
    match command {
        Command::Simulate { scenario, render } => simulate(scenario.as_deref(), render, json),
        Command::Registry(command) => {
            let store = open_store(config_dir)?;
            run_registry_command(command, json, SeatController::open(store)?)
        }
    }
}

/// The explicit directory, or the XDG default when none was given.
fn open_store(config_dir: Option<PathBuf>) -> Result<ConfigStore, CtlError> {
    let store = match config_dir {
        Some(dir) => ConfigStore::new(dir),
        None => ConfigStore::from_env()?,
    };
    debug!(dir = %store.dir().display(), "using configuration directory");
    Ok(store)
}

fn simulate(scenario: Option<&str>, render: bool, json: bool) -> Result<String, CtlError> {
    let run = run_simulation(scenario, render)?;
    let out = if json {
        output::to_json(&run)?
    } else {
        output::simulation_text(&run)
    };
    // The report is still printed when scenarios fail.
    if let Err(e) = run.check() {
        println!("{}", out.trim_end());
        return Err(e);
    }
    Ok(out)
}

fn run_registry_command(
    command: RegistryCommand,
    json: bool,
    mut controller: SeatController<ConfigStore>,
) -> Result<String, CtlError> {
    let out = match command {
        RegistryCommand::ListSeats => {
            let status = controller.status();
            if json {
                output::to_json(&status.seats)?
            } else {
                output::seats_text(&status.seats, &status.default_seat)
            }
        }
        RegistryCommand::ListDevices => {
            let devices = controller.list_devices();
            if json {
                output::to_json(&devices)?
            } else {
                output::devices_text(&devices)
            }
        }
        RegistryCommand::Status => {
            let status = controller.status();
            if json {
                output::to_json(&status)?
            } else {
                output::status_text(&status)
            }
        }
        RegistryCommand::Config => {
            let (config, devices) = controller.documents();
            if json {
                output::to_json(&ConfigView { config, devices })?
            } else {
                output::config_text(config, devices)
            }
        }
        RegistryCommand::CreateSeat { name } => {
            let id = controller.create_seat(&name)?;
            if json {
                output::to_json(&json!({ "created": name, "id": id }))?
            } else {
                format!("Created seat '{name}' with ID {id}")
            }
        }
        RegistryCommand::DestroySeat { name } => {
            controller.destroy_seat(&name)?;
            if json {
                output::to_json(&json!({ "destroyed": name }))?
            } else {
                format!("Destroyed seat '{name}'")
            }
        }
        RegistryCommand::RegisterDevice {
            id,
            name,
            kind,
            vendor,
            product,
        } => {
            let mut device = Device::new(id.as_str(), name, kind);
            if let (Some(vendor), Some(product)) = (vendor, product) {
                device = device.with_usb_ids(vendor, product);
            }
            let seat = controller.register_device(device)?;
            if json {
                output::to_json(&json!({ "registered": id, "kind": kind, "seat": seat }))?
            } else {
                match seat {
                    Some(seat) => format!("Registered device '{id}' on seat '{seat}'"),
                    None => format!("Registered device '{id}' (unassigned)"),
                }
            }
        }
        RegistryCommand::UnregisterDevice { id } => {
            controller.unregister_device(&id)?;
            if json {
                output::to_json(&json!({ "unregistered": id }))?
            } else {
                format!("Unregistered device '{id}'")
            }
        }
        RegistryCommand::Assign { device, seat } => {
            controller.assign_device(&device, &seat)?;
            if json {
                output::to_json(&json!({ "assigned": device, "seat": seat }))?
            } else {
                format!("Assigned device '{device}' to seat '{seat}'")
            }
        }
        RegistryCommand::Unassign { device } => {
            let previous = controller.unassign_device(&device)?;
            if json {
                output::to_json(&json!({ "unassigned": device, "previous_seat": previous }))?
            } else {
                match previous {
                    Some(seat) => format!("Unassigned device '{device}' from seat '{seat}'"),
                    None => format!("Device '{device}' was not assigned"),
                }
            }
        }
    };
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
