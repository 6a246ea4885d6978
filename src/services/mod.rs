pub mod account_service;
pub mod gemini_service;
pub mod plan_text;
pub mod planner_service;
pub mod prompt_builder;
pub mod trip_service;
