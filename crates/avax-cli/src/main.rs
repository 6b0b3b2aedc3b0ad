use avax_mapping::memory::MemoryStore;
use avax_mapping::wrapper::parse_quantity;
use avax_mapping::{
    BlockSummary, BlockWrapper, DecodedBlock, EntityKind, EntityStore, HandlerContext, Project,
    Store, TracingLogger,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct AppContext {
    db_path: String,
    contract: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "avax-replay")]
#[command(about = "Replay decoded Avalanche C-Chain blocks through the mapping handlers")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[arg(long, global = true, default_value = "data/avax.sqlite")]
    db_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every handler over decoded blocks read from a JSON file.
    Replay(ReplayArgs),
    /// Entity counts per table.
    Status,
    /// Print one stored entity as JSON.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON file holding one decoded block or an array of them.
    #[arg(long)]
    input: PathBuf,

    /// Restrict transfer/approve handlers to this contract (overrides AVAX_CONTRACT).
    #[arg(long)]
    contract: Option<String>,

    /// Index into memory and report what would be written.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// block, transaction, event, transfer or approve
    #[arg(long)]
    entity: EntityKind,

    #[arg(long)]
    id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayInput {
    Many(Vec<DecodedBlock>),
    One(Box<DecodedBlock>),
}

impl ReplayInput {
    fn into_blocks(self) -> Vec<DecodedBlock> {
        match self {
            ReplayInput::Many(blocks) => blocks,
            ReplayInput::One(block) => vec![*block],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let ctx = AppContext {
        db_path: cli.db_path,
        contract: std::env::var("AVAX_CONTRACT").ok(),
    };

    match cli.command {
        Commands::Replay(args) => handle_replay(&ctx, args).await,
        Commands::Status => handle_status(&ctx).await,
        Commands::Show(args) => handle_show(&ctx, args).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn handle_replay(ctx: &AppContext, args: ReplayArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .wrap_err_with(|| format!("failed to read {}", args.input.display()))?;
    let blocks = serde_json::from_str::<ReplayInput>(&raw)
        .wrap_err_with(|| format!("{} is not a decoded block file", args.input.display()))?
        .into_blocks();

    let mut project = Project::new()?;
    if let Some(contract) = args.contract.or_else(|| ctx.contract.clone()) {
        info!(contract = %contract, "restricting domain handlers to contract");
        project = project.with_contract(contract);
    }

    let summary = if args.dry_run {
        let store = MemoryStore::new();
        replay_into(&project, &store, &blocks).await?
    } else {
        let store = Store::new(&ctx.db_path).wrap_err("failed to open SQLite store")?;
        replay_into(&project, &store, &blocks).await?
    };

    print_replay_summary(&blocks, &summary, args.dry_run);
    Ok(())
}

async fn replay_into(
    project: &Project,
    store: &dyn EntityStore,
    blocks: &[DecodedBlock],
) -> Result<BlockSummary> {
    let logger = TracingLogger;
    let handler_ctx = HandlerContext::new(store).with_logger(&logger);

    let pb = ProgressBar::new(blocks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} blocks")
            .wrap_err("failed to create progress style")?,
    );

    let mut total = BlockSummary::default();
    for block in blocks {
        let summary = project
            .run_block(&handler_ctx, block)
            .await
            .wrap_err_with(|| format!("failed to index block {}", block.hash()))?;
        total.merge(summary);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        blocks = total.blocks,
        transactions = total.transactions,
        events = total.events,
        "replay complete"
    );
    Ok(total)
}

fn print_replay_summary(blocks: &[DecodedBlock], summary: &BlockSummary, dry_run: bool) {
    let heights: Vec<u64> = blocks.iter().filter_map(|b| b.block_height().ok()).collect();
    let times: Vec<i64> = blocks
        .iter()
        .filter_map(|b| parse_quantity(&b.block().timestamp).ok())
        .filter_map(|ts| i64::try_from(ts).ok())
        .collect();

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);

    table.add_row(vec!["Mode", if dry_run { "dry run" } else { "sqlite" }]);
    match (heights.iter().min(), heights.iter().max()) {
        (Some(min), Some(max)) => table.add_row(vec!["Block Range".to_string(), format!("{min} - {max}")]),
        _ => table.add_row(vec!["Block Range", "N/A"]),
    };
    table.add_row(vec![
        "Time Range".to_string(),
        format!(
            "{} - {}",
            format_unix(times.iter().min().copied()),
            format_unix(times.iter().max().copied())
        ),
    ]);
    table.add_row(vec!["Blocks".to_string(), summary.blocks.to_string()]);
    table.add_row(vec!["Transactions".to_string(), summary.transactions.to_string()]);
    table.add_row(vec!["Events".to_string(), summary.events.to_string()]);
    table.add_row(vec!["Transfers".to_string(), summary.transfers.to_string()]);
    table.add_row(vec!["Approvals".to_string(), summary.approvals.to_string()]);

    println!("{table}");
}

fn format_unix(secs: Option<i64>) -> String {
    secs.and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

async fn handle_status(ctx: &AppContext) -> Result<()> {
    let store = Store::new(&ctx.db_path).wrap_err("failed to open SQLite store")?;

    let db_size_str = if ctx.db_path == ":memory:" {
        "N/A (in-memory)".to_string()
    } else {
        match std::fs::metadata(&ctx.db_path) {
            Ok(metadata) => format!("{} KB", metadata.len() / 1_000),
            Err(_) => "N/A (file not found)".to_string(),
        }
    };

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Table", "Entities"]);
    table.add_row(vec!["Database Path", ctx.db_path.as_str()]);
    table.add_row(vec!["DB Size", &db_size_str]);

    for kind in EntityKind::ALL {
        let count = store
            .count(kind)
            .await
            .wrap_err_with(|| format!("failed to count {}", kind.table()))?;
        table.add_row(vec![kind.table().to_string(), count.to_string()]);
    }

    println!("{table}");
    Ok(())
}

async fn handle_show(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    let store = Store::new(&ctx.db_path).wrap_err("failed to open SQLite store")?;

    let found = match args.entity {
        EntityKind::Block => to_json(store.get_block(&args.id).await?)?,
        EntityKind::Transaction => to_json(store.get_transaction(&args.id).await?)?,
        EntityKind::Event => to_json(store.get_event(&args.id).await?)?,
        EntityKind::Transfer => to_json(store.get_transfer(&args.id).await?)?,
        EntityKind::Approve => to_json(store.get_approve(&args.id).await?)?,
    };

    let entity = found.ok_or_else(|| eyre!("no {} with id {}", args.entity.table(), args.id))?;
    println!("{}", serde_json::to_string_pretty(&entity)?);
    Ok(())
}

fn to_json<T: serde::Serialize>(entity: Option<T>) -> Result<Option<serde_json::Value>> {
    entity
        .map(|e| serde_json::to_value(e).wrap_err("failed to serialize entity"))
        .transpose()
}
