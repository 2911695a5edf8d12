//! Conversation domain: turns, flows, scenarios and the turn policy.
//!
//! Pure logic only. No provider or storage knowledge lives here.

mod catalog;
mod flow;
mod policy;
mod scenario;
mod state;
mod termination;
mod turn;

pub use catalog::{CatalogError, ScenarioCatalog};
pub use flow::{FlowType, ParseFlowTypeError, Sampling};
pub use policy::{TurnPolicy, CHECKIN_FALLBACK_REPLIES, CRISIS_EXHAUSTED_REPLY};
pub use scenario::{
    CheckinScenario, CrisisScenario, CrisisSlots, CrisisStep, ScenarioError, ScenarioRef,
};
pub use state::{CheckinFlags, FlowState, ScriptCursor};
pub use termination::{KeywordTerminationDetector, TerminationDetector};
pub use turn::{Conversation, Speaker, Turn};
