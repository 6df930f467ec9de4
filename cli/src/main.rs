use std::fs;
use std::io::{self, Read};

use clap::{Args, Parser, Subcommand};
use hass_bridge::service::{plan_clear_zone, plan_toggle_zone};
use hass_bridge::{ServiceCall, StateMap, discover_devices, pick_device, plan_save, read_snapshot};
use radar_canvas::engine::SaveRequest;
use radar_canvas::model::Snapshot;
use radar_canvas::zone::ZoneSlot;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Bridge(#[from] hass_bridge::BridgeError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("missing access token; pass --token or set ZONECTL_TOKEN")]
    MissingToken,
    #[error("--apply needs a live host; pass --url or set ZONECTL_URL")]
    ApplyWithoutHost,
    #[error("states and edited snapshot cannot both come from stdin")]
    StdinTwice,
    #[error("host returned HTTP {status}: {message}")]
    HostError { status: u16, message: String },
    #[error("no radar device found in host state")]
    NoDevice,
    #[error("unknown device `{0}`")]
    UnknownDevice(String),
    #[error("zone must be 1-4, got {0}")]
    UnknownZone(u8),
}

#[derive(Parser, Debug)]
#[command(name = "zonectl", about = "Inspect and plan radar zone configuration on a Home Assistant host")]
struct Cli {
    #[arg(long, env = "ZONECTL_STATES", default_value = "-", help = "State dump file, or - for stdin")]
    states: String,

    #[arg(long, env = "ZONECTL_URL", help = "Home Assistant base URL; read live states instead of a dump")]
    url: Option<String>,

    #[arg(long, env = "ZONECTL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "ZONECTL_DEVICE", help = "Device id; defaults to the first discovered")]
    device: Option<String>,

    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices that expose a range entity.
    Devices,
    /// Print pose, zones and targets for the device.
    Snapshot,
    /// Diff an edited snapshot against the host and print the writes.
    PlanSave(PlanSaveArgs),
    /// Disable a zone and zero its coordinates.
    ClearZone(ZoneArgs),
    /// Flip a zone's enable switch.
    ToggleZone(ZoneArgs),
}

#[derive(Args, Debug)]
struct PlanSaveArgs {
    #[arg(help = "Edited snapshot file ({pose, zones}), or - for stdin")]
    edited: String,

    #[arg(long = "clear", help = "Zone slot deleted during the edit; repeatable")]
    clear: Vec<u8>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ZoneArgs {
    zone: u8,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(long, default_value_t = false, help = "Print service calls as JSON")]
    json: bool,

    #[arg(long, default_value_t = false, help = "Send the service calls to the host")]
    apply: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let host = match cli.url.as_deref() {
        Some(url) => Some(Host::connect(url, cli.token.as_deref())?),
        None => None,
    };
    if host.is_none() && cli.states == "-" {
        if let Command::PlanSave(args) = &cli.command {
            if args.edited == "-" {
                return Err(CliError::StdinTwice);
            }
        }
    }

    let states = match &host {
        Some(host) => host.states().await?,
        None => StateMap::from_json(&read_input(&cli.states)?)?,
    };
    tracing::debug!(entities = states.len(), "loaded host states");

    match cli.command {
        Command::Devices => {
            for device in discover_devices(&states) {
                println!("{device}");
            }
            Ok(())
        }
        Command::Snapshot => {
            let device = resolve_device(&states, cli.device.as_deref())?;
            print_json(&serde_json::to_value(read_snapshot(&states, &device))?)
        }
        Command::PlanSave(args) => {
            let device = resolve_device(&states, cli.device.as_deref())?;
            let edited: Snapshot = serde_json::from_str(&read_input(&args.edited)?)?;
            let cleared = args.clear.iter().map(|id| parse_slot(*id)).collect::<Result<Vec<_>, _>>()?;
            let request = SaveRequest {
                snapshot: sanitize_edited(edited),
                baseline: Some(read_snapshot(&states, &device).to_snapshot()),
                cleared,
            };
            emit(plan_save(&device, &request), &args.output, host.as_ref()).await
        }
        Command::ClearZone(args) => {
            let device = resolve_device(&states, cli.device.as_deref())?;
            let calls = plan_clear_zone(&device, parse_slot(args.zone)?);
            emit(calls, &args.output, host.as_ref()).await
        }
        Command::ToggleZone(args) => {
            let device = resolve_device(&states, cli.device.as_deref())?;
            let calls = vec![plan_toggle_zone(&device, parse_slot(args.zone)?)];
            emit(calls, &args.output, host.as_ref()).await
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
}

/// The requested device if the host has it, else the first discovered one.
fn resolve_device(states: &StateMap, requested: Option<&str>) -> Result<String, CliError> {
    let devices = discover_devices(states);
    match requested {
        Some(device) if !devices.iter().any(|d| d == device) => Err(CliError::UnknownDevice(device.to_owned())),
        Some(device) => Ok(device.to_owned()),
        None => pick_device("", &devices).map(ToOwned::to_owned).ok_or(CliError::NoDevice),
    }
}

fn parse_slot(id: u8) -> Result<ZoneSlot, CliError> {
    ZoneSlot::from_id(id).ok_or(CliError::UnknownZone(id))
}

/// Hand-edited files may break the geometry rules; clamp them like the card does.
fn sanitize_edited(mut snapshot: Snapshot) -> Snapshot {
    snapshot.pose = snapshot.pose.clamped();
    let bound = snapshot.pose.range_m;
    for zone in &mut snapshot.zones {
        *zone = zone.clamped(bound);
    }
    snapshot
}

async fn emit(calls: Vec<ServiceCall>, output: &OutputArgs, host: Option<&Host>) -> Result<(), CliError> {
    if output.json {
        print_json(&serde_json::to_value(&calls)?)?;
    } else {
        for call in &calls {
            println!("{call}");
        }
    }

    if output.apply {
        let host = host.ok_or(CliError::ApplyWithoutHost)?;
        for call in &calls {
            host.call_service(call).await?;
        }
        tracing::info!(count = calls.len(), "service calls applied");
    }
    Ok(())
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    };
    read.map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

// ── Host REST client ────────────────────────────────────────────

struct Host {
    client: reqwest::Client,
    base_url: String,
}

impl Host {
    fn connect(base_url: &str, token: Option<&str>) -> Result<Self, CliError> {
        let token = token.ok_or(CliError::MissingToken)?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    async fn states(&self) -> Result<StateMap, CliError> {
        let value = self.request(reqwest::Method::GET, "/api/states", None).await?;
        Ok(StateMap::from_value(value)?)
    }

    async fn call_service(&self, call: &ServiceCall) -> Result<(), CliError> {
        let path = format!("/api/services/{}/{}", call.domain, call.service);
        tracing::debug!(%call, "calling service");
        self.request(reqwest::Method::POST, &path, Some(call.data())).await?;
        Ok(())
    }

    async fn request(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<Value, CliError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, &url);
        let request = if let Some(json) = body { request.json(&json) } else { request };

        let response = request.send().await?;
        let status = response.status();
        let value = response.json::<Value>().await.unwrap_or_else(|_| Value::Null);

        if !status.is_success() {
            return Err(CliError::HostError { status: status.as_u16(), message: value.to_string() });
        }
        Ok(value)
    }
}
