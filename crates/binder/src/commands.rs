//! Command implementations

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use openracing_bindings::{BindRequest, HShifterRequest, SequentialRequest};
use openracing_controls_ini::CONTROLS_FILE_NAME;
use racing_wheel_binder::{AppContext, DeviceScope, SessionStatus};
use tracing::info;

use crate::output;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List attached input devices
    Devices,

    /// Listen for an input and bind it to an action
    Detect {
        /// Action name (STEER, THROTTLE, GEARUP, GEAR_1, ...)
        action: String,
        /// Device index, or `all`
        #[arg(short, long, default_value = "all")]
        device: DeviceScope,
        /// Seconds to wait for input
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Bind an action to a known axis or button
    Bind(BindArgs),

    /// Bind H-shifter gears, e.g. `GEAR_1=12 GEAR_R=19`
    BindShifter {
        #[arg(short, long)]
        controller: i64,
        #[arg(required = true, value_parser = parse_gear_pair)]
        gears: Vec<(String, i64)>,
    },

    /// Bind sequential gear up/down buttons
    BindSequential {
        #[arg(short, long)]
        controller: i64,
        #[arg(long)]
        up: Option<i64>,
        #[arg(long)]
        down: Option<i64>,
    },

    /// Unbind an action, SHIFTER, or a binding id such as THROTTLE_1
    Unbind {
        target: String,
        /// Treat the target as a binding id
        #[arg(long)]
        id: bool,
    },

    /// Clear every binding
    UnbindAll,

    /// Replace the curated device list with the attached devices
    UseDevices,

    /// Remove a device from the curated list
    RemoveDevice {
        /// Instance GUID
        #[arg(required_unless_present = "all")]
        guid: Option<String>,
        #[arg(long, conflicts_with = "guid")]
        all: bool,
    },

    /// Show the current bindings
    Show,

    /// Write the controls file
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print instead of writing
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },

    /// Load bindings from a controls file
    Import { path: PathBuf },

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(group(ArgGroup::new("input").required(true).args(["axis", "button"])))]
pub struct BindArgs {
    pub action: String,
    #[arg(short, long)]
    pub controller: i64,
    /// 1-based axis number
    #[arg(short, long)]
    pub axis: Option<i64>,
    /// 0-based button index
    #[arg(short, long)]
    pub button: Option<i64>,
}

fn parse_gear_pair(value: &str) -> Result<(String, i64), String> {
    let (gear, button) = value
        .split_once('=')
        .ok_or_else(|| format!("expected GEAR=BUTTON, got `{value}`"))?;
    let button = button
        .trim()
        .parse()
        .map_err(|e| format!("invalid button `{button}`: {e}"))?;
    Ok((gear.trim().to_uppercase(), button))
}

pub async fn execute(cmd: &Commands, ctx: &AppContext, json: bool) -> Result<()> {
    let bindings = ctx.bindings();

    match cmd {
        Commands::Devices => {
            let devices = bindings.devices().await?;
            let curated: Vec<_> = ctx.controls_snapshot().devices.iter().cloned().collect();
            output::print_devices(&devices, &curated, json);
        }
        Commands::Detect {
            action,
            device,
            timeout,
        } => detect(ctx, action, *device, timeout.map(Duration::from_secs), json).await?,
        Commands::Bind(args) => {
            let request = BindRequest {
                action: args.action.clone(),
                controller_index: args.controller,
                axis: args.axis,
                button: args.button,
            };
            let bound = bindings.bind(&request).await?;
            output::print_success(
                &format!("{} bound to controller {}", bound.action, bound.controller),
                Some(("request", &request)),
                json,
            );
        }
        Commands::BindShifter { controller, gears } => {
            let request = HShifterRequest {
                controller_index: *controller,
                gears: gears.iter().cloned().collect::<BTreeMap<_, _>>(),
            };
            let count = bindings.bind_h_shifter(&request).await?;
            output::print_success(
                &format!("{count} gears bound on controller {controller}"),
                Some(("request", &request)),
                json,
            );
        }
        Commands::BindSequential {
            controller,
            up,
            down,
        } => {
            let request = SequentialRequest {
                controller_index: *controller,
                gear_up: *up,
                gear_down: *down,
            };
            bindings.bind_sequential(&request).await?;
            output::print_success("Sequential shifter bound", Some(("request", &request)), json);
        }
        Commands::Unbind { target, id } => {
            let message = if *id {
                let action = bindings.unbind_binding(target).await?;
                format!("{action} unbound")
            } else if bindings.unbind(target).await? {
                format!("{} unbound", target.trim().to_uppercase())
            } else {
                format!("{} was not bound", target.trim().to_uppercase())
            };
            output::print_success::<()>(&message, None, json);
        }
        Commands::UnbindAll => {
            bindings.unbind_all().await;
            output::print_success::<()>("All bindings cleared", None, json);
        }
        Commands::UseDevices => {
            let count = bindings.use_devices().await?;
            output::print_success(
                &format!("{count} devices in use"),
                Some(("devices", &ctx.controls_snapshot().devices)),
                json,
            );
        }
        Commands::RemoveDevice { guid, all } => {
            let message = match (guid, all) {
                (_, true) => format!("{} devices removed", bindings.remove_all_devices().await?),
                (Some(guid), false) => {
                    let removed = bindings.remove_device(guid).await?;
                    format!("{} removed", removed.name())
                }
                (None, false) => anyhow::bail!("A device GUID or --all is required"),
            };
            output::print_success::<()>(&message, None, json);
        }
        Commands::Show => output::print_summary(&bindings.summary(), json),
        Commands::Export { out, stdout } => {
            if *stdout {
                print!("{}", bindings.export_text());
            } else {
                let path = export_path(ctx, out.as_deref())?;
                bindings.export_to(&path)?;
                output::print_success(
                    &format!("Controls written to {}", path.display()),
                    Some(("path", &path)),
                    json,
                );
            }
        }
        Commands::Import { path } => {
            bindings.import_from(path).await?;
            output::print_success(
                &format!("Controls imported from {}", path.display()),
                Some(("controls", &bindings.summary())),
                json,
            );
        }
        Commands::Config => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", ctx.config.to_yaml()?);
            }
        }
    }

    Ok(())
}

async fn detect(
    ctx: &AppContext,
    action: &str,
    scope: DeviceScope,
    timeout: Option<Duration>,
    json: bool,
) -> Result<()> {
    let started = ctx.detection.start(action, scope, timeout).await?;
    let id = started
        .session_id
        .context("Detection started without a session id")?;

    let spinner = (!json)
        .then(|| -> Result<ProgressBar> {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(started.status_message.clone());
            pb.enable_steady_tick(Duration::from_millis(100));
            Ok(pb)
        })
        .transpose()?;

    let finished = tokio::select! {
        status = ctx.detection.wait(id) => status,
        _ = tokio::signal::ctrl_c() => {
            info!(session_id = %id, "Interrupted, cancelling detection");
            ctx.detection.cancel(id)?;
            ctx.detection.wait(id).await
        }
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let status: SessionStatus = finished.context("Detection session disappeared")?;
    output::print_session(&status, json);
    if status.is_completed && !status.success {
        anyhow::bail!("{}", status.status_message);
    }
    Ok(())
}

fn export_path(ctx: &AppContext, out: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = out.or(ctx.config.paths.controls_ini.as_deref()) {
        return Ok(path.to_path_buf());
    }
    let dir = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(dir.join(CONTROLS_FILE_NAME))
}
