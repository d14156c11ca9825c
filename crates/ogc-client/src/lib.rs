//! Async WMS and WCS clients.
//!
//! A client is built from an endpoint URL or from a capabilities document
//! already in hand. Capabilities are fetched at most once per client (clones
//! included); layers are read and indexed when the document arrives.
//!
//! ```ignore
//! use ogc_client::{ClientConfig, ClientOptions, WmsClient};
//!
//! let options = ClientOptions::from_config(&ClientConfig::from_env())?;
//! let client = WmsClient::from_url("https://prism.example.org/geoserver/wms", options)?;
//! let days = client.layer_days().await?;
//! ```

pub mod cache;
mod catalog;
pub mod config;
pub mod http;
pub mod wcs;
pub mod wms;

pub use cache::SingleFlight;
pub use config::{ClientConfig, ClientOptions};
pub use http::{HttpFetcher, ReqwestFetcher};
pub use wcs::{CoverageDescription, WcsClient, WcsLayer};
pub use wms::{WmsClient, WmsLayer};
