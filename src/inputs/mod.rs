//! Projection inputs and the persisted configuration format

mod data;
pub mod loader;
mod store;

pub use data::{ActionPlanRow, PlanCategory, ProjectRow, ProjectionInputs, SimulationParameters};
pub use loader::{config_to_string, load_config, parse_config, save_config, write_config};
pub use store::ConfigStore;
