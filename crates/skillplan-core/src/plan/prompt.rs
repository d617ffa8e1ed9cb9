//! Prompt construction for plan generation.
//!
//! Pure and deterministic: the same [`GenerationRequest`] always produces
//! the same [`ChatRequest`].

use super::types::{Difficulty, GenerationRequest, PLAN_DAYS, PlanKind, SchemaVariant};
use crate::provider::ChatRequest;

const SYSTEM_PROMPT: &str = "You are a JSON API that only outputs valid JSON. \
Never include explanations or markdown formatting. \
Always use double quotes for JSON strings. \
Always use \"tasks\" and \"resources\" (plural) as keys, never \"task\" or \"resource\".";

const FLAT_SCHEMA: &str = r#"{
    "day": (number from 1-30),
    "title": "short title for the day",
    "tasks": ["task 1 description", "task 2 description", ...],
    "resources": ["URL or description of free resource 1", ...]
}"#;

const NESTED_SCHEMA: &str = r#"{
    "day": (number from 1-30),
    "title": "short title for the day",
    "tasks": [
        {
            "description": "task 1 description",
            "resources": ["URL or description of free resource for this task", ...]
        },
        ...
    ]
}"#;

const SKILL_EXAMPLE_FLAT: &str = r#"[
    {
        "day": 1,
        "title": "Getting comfortable",
        "tasks": ["Learn the names of the six strings.", "Practice holding the guitar and strumming with a pick."],
        "resources": ["JustinGuitar.com - Beginner's Course Module 1"]
    }
]"#;

const SKILL_EXAMPLE_NESTED: &str = r#"[
    {
        "day": 1,
        "title": "Getting comfortable",
        "tasks": [
            {"description": "Learn the names of the six strings.", "resources": ["JustinGuitar.com - Beginner's Course Module 1"]},
            {"description": "Practice holding the guitar and strumming with a pick.", "resources": ["Andy Guitar - 10 Day Beginner Course - Day 1"]}
        ]
    }
]"#;

const HABIT_EXAMPLE_FLAT: &str = r#"[
    {
        "day": 1,
        "title": "Start tiny",
        "tasks": ["Walk for 10 minutes after lunch.", "Write down what time you walked."],
        "resources": ["NHS Active 10 walking app"]
    }
]"#;

const HABIT_EXAMPLE_NESTED: &str = r#"[
    {
        "day": 1,
        "title": "Start tiny",
        "tasks": [
            {"description": "Walk for 10 minutes after lunch.", "resources": ["NHS Active 10 walking app"]},
            {"description": "Write down what time you walked.", "resources": ["Loop Habit Tracker (free app)"]}
        ]
    }
]"#;

/// Build the chat request for `request`.
pub fn build_chat_request(request: &GenerationRequest) -> ChatRequest {
    ChatRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(request),
    }
}

/// Build the user prompt embedding the topic, plan kind and schema.
///
/// Skill plans always name a level, defaulting to beginner. Habit plans
/// mention one only when it was requested.
pub fn build_user_prompt(request: &GenerationRequest) -> String {
    // JSON-quote the topic so embedded quotes cannot break the prompt.
    let topic = serde_json::Value::String(request.topic().to_string()).to_string();
    let mut prompt = String::with_capacity(4096);

    match (request.kind(), request.difficulty()) {
        (PlanKind::Skill, difficulty) => {
            let level = difficulty.unwrap_or_default();
            prompt.push_str(&format!(
                "Create a {PLAN_DAYS}-day learning plan for the skill {topic} \
                 at a \"{level}\" level.\n\n"
            ));
        }
        (PlanKind::Habit, None) => prompt.push_str(&format!(
            "Create a {PLAN_DAYS}-day plan for building the habit {topic}.\n\n"
        )),
        (PlanKind::Habit, Some(level)) => prompt.push_str(&format!(
            "Create a {PLAN_DAYS}-day plan for building the habit {topic}, \
             pitched at a \"{level}\" level.\n\n"
        )),
    }

    prompt.push_str(&format!(
        "Your response must be a valid JSON array containing exactly {PLAN_DAYS} objects, \
         one for each day. You may instead return a JSON object with a single key \"days\" \
         holding that array. Each object must follow this exact format:\n"
    ));
    let (schema, example) = match (request.variant(), request.kind()) {
        (SchemaVariant::Flat, PlanKind::Skill) => (FLAT_SCHEMA, SKILL_EXAMPLE_FLAT),
        (SchemaVariant::Flat, PlanKind::Habit) => (FLAT_SCHEMA, HABIT_EXAMPLE_FLAT),
        (SchemaVariant::NestedResources, PlanKind::Skill) => (NESTED_SCHEMA, SKILL_EXAMPLE_NESTED),
        (SchemaVariant::NestedResources, PlanKind::Habit) => (NESTED_SCHEMA, HABIT_EXAMPLE_NESTED),
    };
    prompt.push_str(schema);
    prompt.push_str("\n\nImportant:\n");

    let mut rules: Vec<String> = vec![
        "Output ONLY JSON - no explanations or markdown.".to_string(),
        format!("Number the days 1 to {PLAN_DAYS}, each exactly once."),
        "Each day must have between 2 and 4 tasks, described in natural, concise language."
            .to_string(),
    ];
    match request.variant() {
        SchemaVariant::Flat => rules.push(
            "Each day must list 1-2 FREE online resources (websites, apps, videos or courses)."
                .to_string(),
        ),
        SchemaVariant::NestedResources => rules.push(
            "Each task must list 1-2 FREE online resources (websites, apps, videos or courses)."
                .to_string(),
        ),
    }
    match request.kind() {
        PlanKind::Skill => match request.difficulty().unwrap_or_default() {
            Difficulty::Beginner => rules
                .push("Tasks should progress from basics to advanced concepts.".to_string()),
            Difficulty::Intermediate | Difficulty::Advanced => rules.push(
                "Assume the fundamentals are known and build on them from day 1.".to_string(),
            ),
        },
        PlanKind::Habit => {
            rules.push(
                "Start small and increase gradually so the habit sticks without burnout."
                    .to_string(),
            );
        }
    }
    rules.push("The key must be \"tasks\" (plural), not \"task\" (singular).".to_string());

    for (i, rule) in rules.iter().enumerate() {
        prompt.push_str(&format!("{}. {rule}\n", i + 1));
    }

    prompt.push_str("\nExample of the expected format (first day only):\n");
    prompt.push_str(example);
    prompt.push('\n');

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, kind: PlanKind) -> GenerationRequest {
        GenerationRequest::new(topic, kind).unwrap()
    }

    #[test]
    fn prompt_embeds_topic_and_day_count() {
        let prompt = build_user_prompt(&request("guitar", PlanKind::Skill));
        assert!(prompt.contains("30-day learning plan for the skill \"guitar\""));
        assert!(prompt.contains("exactly 30 objects"));
    }

    #[test]
    fn skill_prompt_defaults_to_beginner_level() {
        let prompt = build_user_prompt(&request("guitar", PlanKind::Skill));
        assert!(prompt.contains("at a \"beginner\" level"));
        assert!(prompt.contains("basics to advanced"));
    }

    #[test]
    fn skill_prompt_embeds_requested_level() {
        let req = request("guitar", PlanKind::Skill).with_difficulty(Difficulty::Advanced);
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("skill \"guitar\" at a \"advanced\" level"));
        assert!(prompt.contains("fundamentals are known"));
        assert!(!prompt.contains("basics to advanced"));
    }

    #[test]
    fn habit_prompt_mentions_level_only_when_requested() {
        let plain = build_user_prompt(&request("journaling", PlanKind::Habit));
        assert!(!plain.contains("level"));

        let req = request("journaling", PlanKind::Habit).with_difficulty(Difficulty::Intermediate);
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("pitched at a \"intermediate\" level"));
    }

    #[test]
    fn habit_prompt_differs_from_skill_prompt() {
        let habit = build_user_prompt(&request("journaling", PlanKind::Habit));
        assert!(habit.contains("building the habit \"journaling\""));
        assert!(habit.contains("without burnout"));
        assert!(!habit.contains("basics to advanced"));
    }

    #[test]
    fn topic_is_json_quoted() {
        let prompt = build_user_prompt(&request("say \"hi\"", PlanKind::Skill));
        assert!(prompt.contains(r#""say \"hi\"""#));
    }

    #[test]
    fn prompt_is_deterministic() {
        let req = request("chess", PlanKind::Skill);
        assert_eq!(build_chat_request(&req), build_chat_request(&req));
    }

    #[test]
    fn flat_prompt_describes_day_resources() {
        let prompt = build_user_prompt(&request("chess", PlanKind::Skill));
        assert!(prompt.contains("Each day must list 1-2 FREE"));
        assert!(prompt.contains("\"resources\": [\"URL or description"));
    }

    #[test]
    fn nested_prompt_describes_task_resources() {
        let req = request("chess", PlanKind::Skill).with_variant(SchemaVariant::NestedResources);
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("Each task must list 1-2 FREE"));
        assert!(prompt.contains("\"description\": \"task 1 description\""));
    }

    #[test]
    fn example_is_valid_json() {
        for example in [
            SKILL_EXAMPLE_FLAT,
            SKILL_EXAMPLE_NESTED,
            HABIT_EXAMPLE_FLAT,
            HABIT_EXAMPLE_NESTED,
        ] {
            let value: serde_json::Value = serde_json::from_str(example).expect("valid example");
            assert_eq!(value.as_array().map(Vec::len), Some(1));
        }
    }

    #[test]
    fn system_prompt_demands_json_only() {
        let chat = build_chat_request(&request("chess", PlanKind::Habit));
        assert!(chat.system.contains("only outputs valid JSON"));
    }
}
