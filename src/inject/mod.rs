pub mod planner;
pub mod prompts;

pub use planner::{plan_insertion, InjectionPlan, SyntheticEvent};
pub use prompts::SummaryKind;
