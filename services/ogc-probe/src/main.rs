//! Command-line probe for WMS and WCS endpoints.
//!
//! Reads a capabilities document (from a URL or a local file) and prints
//! layers, available days or request URLs as JSON on stdout. Logs go to
//! stderr.

mod output;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ogc_client::{ClientConfig, ClientOptions, WcsClient, WmsClient};
use ogc_common::BoundingBox;
use ogc_protocol::request::{service_from_url, GetCoverageOptions, GetMapOptions};
use ogc_protocol::{detect_service, Service};

use output::{DaysOutput, LayerSummary};

#[derive(Parser, Debug)]
#[command(name = "ogc-probe")]
#[command(about = "Inspect WMS and WCS capabilities and build request URLs")]
struct Args {
    /// Service endpoint, e.g. https://host/geoserver/wms
    #[arg(long, env = "OGC_URL")]
    url: Option<String>,

    /// Read capabilities from a file instead of fetching them
    #[arg(long)]
    document: Option<PathBuf>,

    /// Service type (detected from the URL or document when omitted)
    #[arg(long, value_enum)]
    service: Option<ServiceArg>,

    /// Protocol version (detected when omitted)
    #[arg(long = "protocol-version")]
    version: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ServiceArg {
    Wms,
    Wcs,
}

impl From<ServiceArg> for Service {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Wms => Service::Wms,
            ServiceArg::Wcs => Service::Wcs,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List layers or coverages
    Layers,

    /// Available days per layer
    Days {
        /// Only this layer
        #[arg(long)]
        layer: Option<String>,
    },

    /// Build a GetMap (WMS) or GetCoverage (WCS) URL for one layer
    ImageUrl {
        #[arg(long)]
        layer: String,

        /// minx,miny,maxx,maxy in lon/lat; WCS falls back to the layer extent
        #[arg(long)]
        bbox: Option<String>,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        /// Day to request (YYYY-MM-DD)
        #[arg(long)]
        time: Option<String>,
    },
}

enum Client {
    Wms(WmsClient),
    Wcs(WcsClient),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = build_client(&args).await?;
    let json = match (&args.command, &client) {
        (Command::Layers, Client::Wms(c)) => to_json(&LayerSummary::list(&c.layers().await?))?,
        (Command::Layers, Client::Wcs(c)) => to_json(&LayerSummary::list(&c.layers().await?))?,
        (Command::Days { layer }, Client::Wms(c)) => {
            to_json(&DaysOutput::select(c.layer_days().await?, layer.as_deref())?)?
        }
        (Command::Days { layer }, Client::Wcs(c)) => {
            to_json(&DaysOutput::select(c.layer_days().await?, layer.as_deref())?)?
        }
        (Command::ImageUrl { layer, bbox, width, height, time }, Client::Wms(c)) => {
            let options = GetMapOptions {
                bbox: parse_bbox(bbox.as_deref())?,
                width: width.unwrap_or(256),
                height: height.unwrap_or(256),
                time: time.clone(),
                ..GetMapOptions::default()
            };
            to_json(&c.layer(layer).await?.image_url(&options)?)?
        }
        (Command::ImageUrl { layer, bbox, width, height, time }, Client::Wcs(c)) => {
            let options = GetCoverageOptions {
                bbox: parse_bbox(bbox.as_deref())?,
                width: *width,
                height: *height,
                time: time.clone(),
                ..GetCoverageOptions::default()
            };
            to_json(&c.layer(layer).await?.image_url(&options)?)?
        }
    };
    println!("{}", json);
    Ok(())
}

async fn build_client(args: &Args) -> Result<Client> {
    let mut config = ClientConfig::from_env();
    if let Some(version) = &args.version {
        config = config.with_version(version.clone());
    }

    let document = match &args.document {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let service = args
        .service
        .map(Service::from)
        .or(config.service)
        .or_else(|| args.url.as_deref().and_then(service_from_url).and_then(|s| s.parse().ok()))
        .or_else(|| document.as_deref().and_then(|d| detect_service(d).ok()))
        .ok_or_else(|| anyhow!("Cannot determine the service; pass --service"))?;
    let options = ClientOptions::from_config(&config.with_service(service))?;

    info!(service = %service, "Probing");
    let client = match (document, &args.url) {
        (Some(xml), _) => match service {
            Service::Wms => Client::Wms(WmsClient::from_document(xml, options)?),
            Service::Wcs => Client::Wcs(WcsClient::from_document(xml, options)?),
        },
        (None, Some(url)) => match service {
            Service::Wms => Client::Wms(WmsClient::from_url(url, options)?),
            Service::Wcs => Client::Wcs(WcsClient::from_url(url, options)?),
        },
        (None, None) => bail!("Either --url or --document is required"),
    };
    Ok(client)
}

fn parse_bbox(s: Option<&str>) -> Result<Option<BoundingBox>> {
    s.map(|s| BoundingBox::from_wms_string(s).with_context(|| format!("Invalid --bbox {}", s)))
        .transpose()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}
