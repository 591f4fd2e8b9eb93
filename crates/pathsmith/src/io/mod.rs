//! File-format boundary (spec §6.1–§6.3): scenario JSON, move JSON, and
//! `.scen` export/import. No direct teacher counterpart; follows the
//! teacher's plain hand-rolled error style (`error.rs`'s `ScenarioError`)
//! rather than inventing a new one.

pub mod move_file;
pub mod scen_export;
pub mod scenario;

pub use move_file::load_move_file;
pub use scen_export::{export_scen, parse_scen};
pub use scenario::{load_scenario, LoadedScenario};
