//! Plan content pipeline: prompt construction, generation, sanitization,
//! validation and storage.

pub mod generate;
pub mod prompt;
pub mod sanitize;
pub mod service;
pub mod types;
pub mod validate;

pub use generate::{PlanGenerator, extract_message_content};
pub use prompt::{build_chat_request, build_user_prompt};
pub use sanitize::sanitize;
pub use service::{complete_day, delete_plan, load_plan, save_generated_plan};
pub use types::{
    DayPlan, Difficulty, GenerationRequest, PLAN_DAYS, Plan, PlanKind, RESOURCES_PER_DAY,
    SchemaVariant, TASKS_PER_DAY, TOPIC_CHARS, TaskItem,
};
pub use validate::{validate, validate_value, validate_with};
