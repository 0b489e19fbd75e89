use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use canvas::engine::{EngineCore, ViewportRect};
use canvas::export::{DirSpriteSource, ExportError, export_png};
use canvas::input::InputEvent;
use canvas::session::{MapSession, ViewLiveness, load_initial};
use clap::{Args, Parser, Subcommand};
use client::{ClientConfig, HttpMapStore};
use maps::{MapId, MapStore, StoreError};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Viewport the scripted editor is mounted in; script coordinates are
/// relative to its top-left corner.
const SCRIPT_VIEWPORT: ViewportRect = ViewportRect { left: 0.0, top: 0.0, width: 1280.0, height: 800.0 };

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("failed to read script {path}: {source}")]
    ReadScript { path: String, source: io::Error },
    #[error("{path}:{line}: invalid event: {source}")]
    InvalidEvent { path: String, line: usize, source: serde_json::Error },
    #[error("failed to write {path}: {source}")]
    WriteFile { path: String, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "mapmaker", about = "Grid map editor: list, edit and export maps")]
struct Cli {
    #[arg(long, env = "MAPS_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "MAPS_SESSION_COOKIE")]
    session_cookie: Option<String>,

    #[arg(long, env = "MAPS_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[arg(long, env = "MAPMAKER_ASSETS", default_value = "assets/furniture", help = "Directory of furniture sprites")]
    assets: PathBuf,

    #[arg(long, default_value_t = 1.0, help = "Device pixel multiplier for exports (capped at 2)")]
    dpr: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    config: ClientConfig,
    assets: PathBuf,
    dpr: f64,
}

#[derive(Subcommand, Debug)]
enum Command {
    Maps(MapsCommand),
    Edit(EditArgs),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct MapsCommand {
    #[command(subcommand)]
    command: MapsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MapsSubcommand {
    List,
    Show { map_id: MapId },
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long, help = "Start from a stored map instead of the demo layout")]
    map_id: Option<MapId>,

    #[arg(long, help = "JSON Lines gesture script, or - for stdin")]
    script: Option<String>,

    #[arg(long, value_name = "NAME", help = "Save the result under this name")]
    save: Option<String>,

    #[arg(long, value_name = "DIR", help = "Write map.png into this directory")]
    export: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    map_id: Option<MapId>,

    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if cli.session_cookie.is_some() {
        config.session_cookie = cli.session_cookie;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = secs;
    }
    let ctx = CliContext { config, assets: cli.assets, dpr: cli.dpr };

    match cli.command {
        Command::Maps(maps) => run_maps(&ctx, maps).await,
        Command::Edit(args) => run_edit(&ctx, args).await,
        Command::Export(args) => run_export(&ctx, args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn run_maps(ctx: &CliContext, maps: MapsCommand) -> Result<(), CliError> {
    let store = HttpMapStore::new(&ctx.config)?;
    match maps.command {
        MapsSubcommand::List => {
            let items = store.list().await?;
            print_json(&serde_json::to_value(items)?)
        }
        MapsSubcommand::Show { map_id } => {
            let record = store.read(map_id).await?;
            print_json(&serde_json::to_value(record)?)
        }
    }
}

async fn run_edit(ctx: &CliContext, args: EditArgs) -> Result<(), CliError> {
    let needs_store = args.map_id.is_some() || args.save.is_some();
    let store = if needs_store { Some(HttpMapStore::new(&ctx.config)?) } else { None };

    let mut core = EngineCore::with_demo_layout();
    core.mount_viewport(SCRIPT_VIEWPORT);
    let mut session = MapSession::new();

    if let (Some(store), Some(map_id)) = (&store, args.map_id) {
        open_map(store, map_id, &mut session, &mut core).await?;
    }

    if let Some(path) = &args.script {
        let replayed = replay_script(&mut core, path)?;
        info!(events = replayed, "script replayed");
    }

    let mut saved = Value::Null;
    if let (Some(store), Some(name)) = (&store, &args.save) {
        let record = session.save(store, &core, Some(name)).await?;
        saved = json!({ "id": record.id, "name": record.name, "version": record.version });
    }

    let mut exported = Value::Null;
    if let Some(dir) = &args.export {
        exported = json!(write_export(ctx, &core, dir).await?);
    }

    let selection = core.selection().map(|sel| {
        json!({ "x0": sel.min().x, "y0": sel.min().y, "x1": sel.max().x, "y1": sel.max().y })
    });
    let camera = core.camera();
    print_json(&json!({
        "tiles": core.tiles.len(),
        "furniture": core.furniture.len(),
        "selection": selection,
        "camera": { "panX": camera.pan_x, "panY": camera.pan_y, "zoom": camera.zoom },
        "saved": saved,
        "exported": exported,
    }))
}

async fn run_export(ctx: &CliContext, args: ExportArgs) -> Result<(), CliError> {
    let mut core = EngineCore::with_demo_layout();
    if let Some(map_id) = args.map_id {
        let store = HttpMapStore::new(&ctx.config)?;
        open_map(&store, map_id, &mut MapSession::new(), &mut core).await?;
    }
    let path = write_export(ctx, &core, &args.out).await?;
    print_json(&json!({ "path": path }))
}

async fn open_map(
    store: &dyn MapStore,
    map_id: MapId,
    session: &mut MapSession,
    core: &mut EngineCore,
) -> Result<(), CliError> {
    let liveness = ViewLiveness::new();
    match load_initial(store, map_id, &liveness).await {
        Ok(Some(record)) => {
            session.apply_record(core, &record);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            session.fail(&err);
            Err(err.into())
        }
    }
}

/// Feed every event in a JSON Lines script to the engine. Blank lines are skipped.
fn replay_script(core: &mut EngineCore, path: &str) -> Result<usize, CliError> {
    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file =
            File::open(path).map_err(|source| CliError::ReadScript { path: path.to_owned(), source })?;
        Box::new(BufReader::new(file))
    };

    let mut replayed = 0_usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::ReadScript { path: path.to_owned(), source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: InputEvent = serde_json::from_str(trimmed).map_err(|source| CliError::InvalidEvent {
            path: path.to_owned(),
            line: index + 1,
            source,
        })?;
        let actions = core.dispatch(&event);
        debug!(line = index + 1, ?event, actions = actions.len(), "event dispatched");
        replayed += 1;
    }
    Ok(replayed)
}

/// Rasterize the map and write `map.png` into `dir`, returning the file path.
async fn write_export(ctx: &CliContext, core: &EngineCore, dir: &Path) -> Result<String, CliError> {
    let sprites = DirSpriteSource::new(&ctx.assets);
    let artifact = match export_png(&core.tiles, &core.furniture, &sprites, ctx.dpr).await {
        Ok(artifact) => artifact,
        Err(err) => {
            warn!(error = %err, "export aborted");
            return Err(err.into());
        }
    };

    let path = dir.join(artifact.file_name);
    let shown = path.display().to_string();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| CliError::WriteFile { path: dir.display().to_string(), source })?;
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .map_err(|source| CliError::WriteFile { path: shown.clone(), source })?;

    info!(path = %shown, width = artifact.width, height = artifact.height, "export written");
    Ok(shown)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
