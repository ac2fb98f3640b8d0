//! Typed client for the Rackspace Cloud Big Data ("Lava") API.
//!
//! The crate is built around a small declarative schema engine: every
//! resource declares its fields once, and a single validation routine turns
//! raw JSON into typed, immutable instances. On top of that sit one handler
//! per resource and a fixed-interval wait loop for long-running
//! provisioning operations.
//!
//! # Example
//!
//! ```no_run
//! use lava_api::{ClusterHandler, LavaClient};
//!
//! # async fn example() -> lava_api::Result<()> {
//! let client = LavaClient::builder()
//!     .api_url("https://dfw.bigdata.api.rackspacecloud.com/v2")
//!     .tenant("123456")
//!     .token("0123456789abcdef")
//!     .build()?;
//!
//! let clusters = ClusterHandler::new(client.clone());
//! for cluster in clusters.list().await? {
//!     println!("{} is {}", cluster.name(), cluster.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod attr;
pub mod client;
pub mod clusters;
pub mod error;
pub mod flavors;
pub mod progress;
pub mod request;
pub mod schema;
pub mod scripts;
pub mod stacks;
pub mod text;
pub mod workloads;

pub use attr::AttrPath;
pub use client::{LavaClient, LavaClientBuilder};
pub use clusters::{Cluster, ClusterCreateParams, ClusterDetail, ClusterHandler, NodeGroupSpec};
pub use error::{Error, Result};
pub use flavors::{Flavor, FlavorHandler};
pub use progress::{
    elapsed_minutes, wait_for_status, ProgressCallback, ProgressEvent, StatusSource,
};
pub use request::marshal;
pub use schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};
pub use scripts::{Script, ScriptHandler, ScriptParams};
pub use stacks::{Stack, StackCreateParams, StackDetail, StackHandler};
pub use workloads::{Recommendation, RecommendationParams, Workload, WorkloadHandler};
