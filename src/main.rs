//! Command-line front end: fetches BGP path data from the RIPEstat API
//! and renders it as directed graph images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bgpgrapher::api::{self, Resource, RisClient};
use bgpgrapher::layout::{spring_layout, LayoutOptions};
use bgpgrapher::path_graph::{collect_replay, Asn, StateGraph};
use bgpgrapher::render::{render_svg, RenderOptions};

fn parse_resource_arg(s: &str) -> Result<Resource, String> {
    Resource::parse(s).map_err(|err| err.to_string())
}

fn parse_asn_arg(s: &str) -> Result<Asn, String> {
    api::parse_asn(s).map_err(|err| err.to_string())
}

fn parse_timestamp_arg(s: &str) -> Result<NaiveDateTime, String> {
    api::parse_timestamp(s).map_err(|err| err.to_string())
}

#[derive(Parser)]
#[command(name = "bgpgrapher")]
#[command(author, version)]
#[command(about = "Render RIPEstat BGP path data as directed graph images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RIPEstat data API base URL
    #[arg(long, global = true, default_value = api::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = api::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Fixed layout seed, for reproducible images
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Suppress status output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph every AS path announced for a resource at one moment
    State {
        /// IP prefix or ASN to look up
        #[arg(long, value_parser = parse_resource_arg)]
        resource: Resource,

        /// Moment to query, e.g. 2024-05-01T10:00:00
        #[arg(long, value_parser = parse_timestamp_arg)]
        timestamp: NaiveDateTime,

        /// Output SVG file
        #[arg(short, long, default_value = "bgp_state.svg")]
        output: PathBuf,
    },

    /// Replay announcement events for one origin AS over a time window
    Play {
        /// IP prefix or ASN to look up
        #[arg(long, value_parser = parse_resource_arg)]
        resource: Resource,

        /// Origin ASN whose paths are replayed, e.g. AS3333
        #[arg(long, value_parser = parse_asn_arg)]
        filter_asn: Asn,

        /// Window start, e.g. 2024-05-01T10:00:00
        #[arg(long, value_parser = parse_timestamp_arg)]
        starttime: NaiveDateTime,

        /// Window end
        #[arg(long, value_parser = parse_timestamp_arg)]
        endtime: NaiveDateTime,

        /// Directory for the numbered snapshot files
        /// (default: ~/bgpgrapher_snapshots)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn setup_logging(quiet: bool) {
    let filter = if quiet {
        "bgpgrapher=error"
    } else {
        "bgpgrapher=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bgpgrapher_snapshots")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.quiet);

    let client = RisClient::with_options(&cli.endpoint, Duration::from_secs(cli.timeout_secs))?;

    match cli.command {
        Commands::State {
            resource,
            timestamp,
            output,
        } => run_state(&client, &resource, &timestamp, &output, cli.seed, cli.quiet),
        Commands::Play {
            resource,
            filter_asn,
            starttime,
            endtime,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(default_output_dir);
            run_play(
                &client,
                &resource,
                &filter_asn,
                &starttime,
                &endtime,
                &output_dir,
                cli.seed,
                cli.quiet,
            )
        }
    }
}

fn run_state(
    client: &RisClient,
    resource: &Resource,
    timestamp: &NaiveDateTime,
    output: &Path,
    seed: Option<u64>,
    quiet: bool,
) -> anyhow::Result<()> {
    let data = client.bgp_state(resource, timestamp)?;
    let state = StateGraph::from_entries(&data.bgp_state);
    if !quiet {
        println!(
            "Fetched {} paths: {} nodes, {} edges",
            data.bgp_state.len(),
            state.graph.node_count(),
            state.graph.edge_count()
        );
    }

    let positions = spring_layout(&state.graph, &LayoutOptions::snapshot().with_seed(seed));
    let caption = format!(
        "BGP state for {} at {}",
        resource,
        api::format_timestamp(timestamp)
    );
    let svg = render_svg(
        &state.graph,
        &positions,
        state.main_node.as_ref(),
        &caption,
        &RenderOptions::snapshot(),
    );
    fs::write(output, svg).with_context(|| format!("failed to write {}", output.display()))?;

    if !quiet {
        println!("Wrote {}", output.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_play(
    client: &RisClient,
    resource: &Resource,
    filter_asn: &Asn,
    starttime: &NaiveDateTime,
    endtime: &NaiveDateTime,
    output_dir: &Path,
    seed: Option<u64>,
    quiet: bool,
) -> anyhow::Result<()> {
    let data = client.bgplay(resource, starttime, endtime)?;
    if !quiet {
        println!(
            "Fetched {} initial paths and {} events",
            data.initial_state.len(),
            data.events.len()
        );
    }

    let outcome = collect_replay(&data, filter_asn)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(outcome.snapshots.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} snapshots")?
            .progress_chars("##-"),
    );

    let options = LayoutOptions::default().with_seed(seed);
    for (index, snapshot) in outcome.snapshots.iter().enumerate() {
        let positions = spring_layout(&snapshot.graph, &options);
        let svg = render_svg(
            &snapshot.graph,
            &positions,
            None,
            &snapshot.caption,
            &RenderOptions::replay(),
        );
        let path = output_dir.join(format!("snapshot_{:03}.svg", index));
        fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        pb.inc(1);
    }
    pb.finish();

    if !quiet {
        println!(
            "Wrote {} snapshots to {}",
            outcome.snapshots.len(),
            output_dir.display()
        );
        if !outcome.skipped.is_empty() {
            println!("Skipped {} unsupported events", outcome.skipped.len());
        }
    }
    Ok(())
}
