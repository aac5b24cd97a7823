//! # Rigflow
//!
//! Rigflow is a decision engine for guided field troubleshooting of rig
//! equipment. Procedures are authored as JSON rule packs; a session's
//! history of technician submissions decides which step comes next.
//!
//! ## Core Features
//!
//! - **Two authoring dialects**: legacy `type` nodes and newer `kind` steps normalize into one closed node set
//! - **Spec parsing**: free-text expectations such as `24 VDC ±10%` or `>= 3000` become evaluable specs
//! - **Validation**: fatal structural checks plus reachability, dead-end and open-spec warnings
//! - **Simulation**: replay scripted readings through a pack before publishing it
//! - **Session service**: an [`Assistant`] over pluggable pack and action stores
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rigflow::{RulePack, simulate_rule_pack, validate_graph};
//!
//! let pack = RulePack::from_json(json_str)?;
//! let report = validate_graph(&pack)?;
//! for message in report.messages() {
//!     println!("warning: {}", message);
//! }
//!
//! let trace = simulate_rule_pack(&pack, &[(1250.0, true).into(), (175.0, true).into(), (0.0, true).into()])?;
//! assert_eq!(trace.final_node_key, "done_success");
//! ```

mod assistant;
mod builder;
mod common;
mod config;
mod error;
pub mod measure;
mod model;
pub mod pack;
pub mod resolver;
pub mod simulator;
pub mod store;
mod utils;
pub mod validator;

use std::sync::{Arc, RwLock};

pub use assistant::{Assistant, Submission};
pub use builder::AssistantBuilder;
pub use config::{CacheConfig, Config, SimulatorConfig, ValidatorConfig};
pub use error::RigflowError;
pub use measure::{ParsedSpec, Unit, convert_unit, evaluate, format_spec, normalize_unit, parse_spec};
pub use model::*;
pub use pack::{RulePack, node::Node};
pub use resolver::next_step_id;
pub use simulator::{SimInput, SimulateOptions, SimulationMode, SimulationTrace, simulate_rule_pack, simulate_rule_pack_with};
pub use validator::{ValidationReport, Warning, validate_graph, validate_graph_with};

/// Result type alias for Rigflow operations.
pub type Result<T> = std::result::Result<T, RigflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
