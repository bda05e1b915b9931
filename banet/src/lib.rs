//! # BANet-Burn
//!
//! Building blocks for training the BANet segmentation network with Burn:
//!
//! - [`ConfigDict`] and [`ConfigLoader`]: declarative TOML/JSON configuration
//!   with subscript, attribute and dotted-path access.
//! - [`Registry`]: build objects from `{ type = "...", ...args }` specs.
//! - [`losses`]: soft cross-entropy, Dice and the composite [`BANetLoss`].
//! - [`metrics`]: a pixel [`ConfusionMatrix`].

mod config;
mod error;
pub mod losses;
pub mod metrics;
mod registry;

pub use config::*;
pub use error::{BANetError, BANetResult};
pub use losses::{
    loss_registry, BANetLoss, BANetLossConfig, DiceLoss, DiceLossConfig, DynSegmentationLoss,
    JointLoss, JointLossConfig, SegmentationLoss, SoftCrossEntropyLoss,
    SoftCrossEntropyLossConfig,
};
pub use metrics::ConfusionMatrix;
pub use registry::{build_object, Constructor, Factory, Registry, TYPE_KEY};
