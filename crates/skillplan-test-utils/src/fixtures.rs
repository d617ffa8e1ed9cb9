//! Builders for plan JSON shaped the way a generation provider returns it.

use serde_json::{Value, json};

/// A flat day object with `tasks` task strings and `resources` resources.
pub fn flat_day(day: u32, tasks: usize, resources: usize) -> Value {
    json!({
        "day": day,
        "title": format!("Day {day}"),
        "tasks": (1..=tasks).map(|i| format!("Day {day} task {i}")).collect::<Vec<_>>(),
        "resources": (1..=resources)
            .map(|i| format!("https://example.com/day-{day}/resource-{i}"))
            .collect::<Vec<_>>(),
    })
}

/// A day object whose tasks each carry their own resources.
pub fn nested_day(day: u32, tasks: usize, resources_per_task: usize) -> Value {
    let tasks: Vec<Value> = (1..=tasks)
        .map(|i| {
            json!({
                "description": format!("Day {day} task {i}"),
                "resources": (1..=resources_per_task)
                    .map(|r| format!("https://example.com/day-{day}/task-{i}/{r}"))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "day": day, "tasks": tasks })
}

/// `count` flat days numbered from 1, each with 2 tasks and 1 resource.
pub fn flat_days(count: u32) -> Vec<Value> {
    (1..=count).map(|d| flat_day(d, 2, 1)).collect()
}

/// A complete 30-day flat plan as a JSON array.
pub fn flat_plan() -> Value {
    Value::Array(flat_days(30))
}

/// A complete 30-day nested-resources plan as a JSON array.
pub fn nested_plan() -> Value {
    Value::Array((1..=30).map(|d| nested_day(d, 2, 1)).collect())
}

/// Wrap `content` in an OpenAI-style chat completion envelope.
pub fn chat_envelope(content: &str) -> Value {
    json!({
        "id": "gen-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": content },
        }],
    })
}
