//! Normalize and validate a candidate plan.
//!
//! Parses the sanitized text, unwraps a provider-added wrapper object,
//! renames accepted key aliases, and checks:
//! - Exactly 30 day objects.
//! - Each `day` is an integer in 1..=30 and appears once.
//! - 2-4 tasks per day.
//! - 1-2 resources per day (flat schema) or per task (nested schema).
//!
//! The first violation aborts validation.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use super::types::{
    DayPlan, PLAN_DAYS, Plan, RESOURCES_PER_DAY, SchemaVariant, TASKS_PER_DAY, TaskItem,
};
use crate::error::{MalformedResponse, PipelineError, SchemaViolation};

/// Accepted `(alias, canonical)` keys on a day object.
const DAY_ALIASES: &[(&str, &str)] = &[
    ("task", "tasks"),
    ("resource", "resources"),
    ("day_number", "day"),
];

/// Accepted `(alias, canonical)` keys on a task object.
const TASK_ALIASES: &[(&str, &str)] = &[
    ("task", "description"),
    ("text", "description"),
    ("resource", "resources"),
];

/// Validate `candidate` against the canonical flat schema.
pub fn validate(candidate: &str) -> Result<Plan, PipelineError> {
    validate_with(candidate, SchemaVariant::Flat)
}

/// Parse `candidate` as JSON and validate it against `variant`.
pub fn validate_with(candidate: &str, variant: SchemaVariant) -> Result<Plan, PipelineError> {
    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        MalformedResponse::InvalidJson {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
            position: byte_offset(candidate, e.line(), e.column()),
        }
    })?;
    Ok(validate_value(value, variant)?)
}

/// Validate an already-parsed JSON value against `variant`.
///
/// Also used to reload stored plans, which are kept in canonical form.
pub fn validate_value(value: Value, variant: SchemaVariant) -> Result<Plan, SchemaViolation> {
    let items = into_day_array(value)?;
    if items.len() != PLAN_DAYS {
        return Err(SchemaViolation::DayCount {
            expected: PLAN_DAYS,
            observed: items.len(),
        });
    }

    let mut seen = [false; PLAN_DAYS + 1];
    let mut days = Vec::with_capacity(PLAN_DAYS);
    for (index, item) in items.into_iter().enumerate() {
        let day = validate_day(index, item, variant)?;
        let slot = &mut seen[day.day as usize];
        if *slot {
            return Err(SchemaViolation::DuplicateDay { day: day.day });
        }
        *slot = true;
        days.push(day);
    }

    Ok(Plan::from_validated(days))
}

/// Accept a bare array, or an object with exactly one array-valued field
/// (e.g. `{"total_days": 30, "days": [...]}`).
fn into_day_array(value: Value) -> Result<Vec<Value>, SchemaViolation> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut lists = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match (lists.next(), lists.next()) {
                (Some(items), None) => Ok(items),
                _ => Err(SchemaViolation::NotAnArray),
            }
        }
        _ => Err(SchemaViolation::NotAnArray),
    }
}

/// Rename alias keys to their canonical name. A canonical key that is
/// already present wins and the alias is left untouched.
fn apply_aliases(obj: &mut Map<String, Value>, aliases: &[(&str, &str)]) {
    for (alias, canonical) in aliases {
        if obj.contains_key(*canonical) {
            continue;
        }
        if let Some(value) = obj.remove(*alias) {
            obj.insert((*canonical).to_string(), value);
        }
    }
}

fn validate_day(index: usize, item: Value, variant: SchemaVariant) -> Result<DayPlan, SchemaViolation> {
    let Value::Object(mut obj) = item else {
        return Err(SchemaViolation::NotAnObject { index });
    };
    apply_aliases(&mut obj, DAY_ALIASES);

    let raw_day = obj.remove("day").ok_or(SchemaViolation::MissingDay { index })?;
    let day = parse_day_number(&raw_day).ok_or_else(|| SchemaViolation::InvalidDay {
        index,
        value: raw_day.to_string(),
        max: PLAN_DAYS,
    })?;

    let title = match obj.remove("title") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => return Err(SchemaViolation::InvalidTitle { day }),
    };

    let raw_tasks = take_list(&mut obj, day, "tasks")?
        .ok_or(SchemaViolation::MissingField { day, field: "tasks" })?;
    check_count(day, "tasks", raw_tasks.len(), TASKS_PER_DAY)?;

    let raw_resources = take_list(&mut obj, day, "resources")?;
    let resources = match (raw_resources, variant) {
        (Some(list), _) => {
            check_count(day, "resources", list.len(), RESOURCES_PER_DAY)?;
            string_entries(day, "resources", list)?
        }
        (None, SchemaVariant::Flat) => {
            return Err(SchemaViolation::MissingField {
                day,
                field: "resources",
            });
        }
        (None, SchemaVariant::NestedResources) => Vec::new(),
    };

    let tasks = raw_tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| normalize_task(day, i, task, variant))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DayPlan {
        day,
        title,
        tasks,
        resources,
    })
}

fn parse_day_number(value: &Value) -> Option<u32> {
    let n = match value {
        // Integral floats such as `1.0` count as whole days.
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (1.0..=PLAN_DAYS as f64).contains(f))
                .map(|f| f as u64)
        })?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n)
        .ok()
        .filter(|d| (1..=PLAN_DAYS as u32).contains(d))
}

/// Remove `field` and require it to be an array. Absent or `null` is `None`.
fn take_list(
    obj: &mut Map<String, Value>,
    day: u32,
    field: &'static str,
) -> Result<Option<Vec<Value>>, SchemaViolation> {
    match obj.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(SchemaViolation::NotAList { day, field }),
    }
}

fn check_count(
    day: u32,
    field: &'static str,
    observed: usize,
    allowed: RangeInclusive<usize>,
) -> Result<(), SchemaViolation> {
    if allowed.contains(&observed) {
        return Ok(());
    }
    Err(SchemaViolation::Count {
        day,
        field,
        observed,
        min: *allowed.start(),
        max: *allowed.end(),
    })
}

fn string_entries(
    day: u32,
    field: &'static str,
    items: Vec<Value>,
) -> Result<Vec<String>, SchemaViolation> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(SchemaViolation::InvalidEntry { day, field, index }),
        })
        .collect()
}

fn normalize_task(
    day: u32,
    index: usize,
    task: Value,
    variant: SchemaVariant,
) -> Result<TaskItem, SchemaViolation> {
    let item = match task {
        Value::String(s) if !s.trim().is_empty() => TaskItem::new(s),
        Value::Object(mut obj) => {
            apply_aliases(&mut obj, TASK_ALIASES);
            let description = match obj.remove("description") {
                Some(Value::String(s)) if !s.trim().is_empty() => s,
                _ => return Err(SchemaViolation::InvalidTask { day, index }),
            };
            let resources = match obj.remove("resources") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::String(s)) => string_entries(day, "task resources", vec![Value::String(s)])?,
                Some(Value::Array(items)) => string_entries(day, "task resources", items)?,
                Some(_) => {
                    return Err(SchemaViolation::NotAList {
                        day,
                        field: "task resources",
                    });
                }
            };
            TaskItem {
                description,
                resources,
            }
        }
        _ => return Err(SchemaViolation::InvalidTask { day, index }),
    };

    if variant == SchemaVariant::NestedResources && !RESOURCES_PER_DAY.contains(&item.resources.len()) {
        return Err(SchemaViolation::TaskResourceCount {
            day,
            task: index + 1,
            observed: item.resources.len(),
            min: *RESOURCES_PER_DAY.start(),
            max: *RESOURCES_PER_DAY.end(),
        });
    }
    Ok(item)
}

/// Byte offset of a 1-based `(line, column)` position reported by serde_json.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}
