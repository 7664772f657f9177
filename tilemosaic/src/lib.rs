//! TileMosaic - web-map tile acquisition and mosaic assembly
//!
//! Downloads every tile covering a geographic bounding box from a web-map
//! provider and stitches the tiles into a single raster with the corner
//! coordinates needed to georeference it.
//!
//! # Pipeline
//!
//! ```ignore
//! use tilemosaic::coord::GeoBoundingBox;
//! use tilemosaic::fetch::{FetchScheduler, ReqwestClient, SchedulerConfig};
//! use tilemosaic::mosaic::MosaicAssembler;
//! use tilemosaic::plan::TilePlan;
//! use tilemosaic::provider::{ProviderResolver, ProviderSpec};
//!
//! let spec = ProviderSpec::from_names("bing", "satellite")?;
//! spec.check_zoom(15)?;
//!
//! let plan = TilePlan::new(&GeoBoundingBox::new(44.65, 44.487, 33.377, 33.63), 15)?;
//! let mut resolver = ProviderResolver::new(spec, "./tiles");
//! let requests = plan.shuffled_requests(&mut resolver);
//!
//! let config = SchedulerConfig::default();
//! let client = ReqwestClient::new(config.request_timeout())?;
//! let summary = FetchScheduler::new(client, config).run(requests).await?;
//!
//! let mosaic = MosaicAssembler::new(spec, 15).assemble("./tiles".as_ref())?;
//! mosaic.save("mosaic.png".as_ref())?;
//! let handoff = mosaic.handoff("mosaic.png");
//! ```
//!
//! Tiles on disk are the only state shared between fetching and assembly, so
//! an interrupted run resumes where it stopped.

pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod mosaic;
pub mod naming;
pub mod plan;
pub mod provider;

/// Version of the TileMosaic library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
