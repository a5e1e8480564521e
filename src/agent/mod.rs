//! Extraction strategy planning
//!
//! A planner turns a URL plus natural-language instructions into an
//! [`ExtractionStrategy`]. Planner failures are never fatal: the crawl falls
//! back to the default strategy.

mod planner;
mod relevance;
mod strategy;

pub use planner::{plan_or_default, InstructionPlanner, PlannerError, StrategyPlanner};
pub use relevance::{relevance_score, score_items};
pub use strategy::{parse_strategy, ExtractionStrategy};
