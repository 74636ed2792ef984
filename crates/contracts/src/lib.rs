//! Cross-boundary contracts shared by the engines, the document store, and the HTTP API.

use serde::{Deserialize, Serialize};

/// Flat experience reward granted when a daily quest is fully completed.
pub const QUEST_COMPLETION_EXP: i64 = 50;
/// Ability points granted per level gained.
pub const LEVEL_UP_ABILITY_POINTS: i64 = 3;

pub const DEFAULT_DAILY_QUEST_ID: &str = "daily";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestTask {
    pub id: String,
    pub name: String,
    pub goal: f64,
    pub current: f64,
    pub unit: String,
}

impl QuestTask {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        goal: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            goal,
            current: 0.0,
            unit: unit.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.goal
    }
}

/// A named collection of tasks. `is_completed` is derived from the task
/// list and recomputed on every mutation; it is never set independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub tasks: Vec<QuestTask>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub hp: i64,
    pub mp: i64,
    pub fatigue: i64,
    #[serde(rename = "str")]
    pub strength: i64,
    #[serde(rename = "vit")]
    pub vitality: i64,
    #[serde(rename = "agi")]
    pub agility: i64,
    #[serde(rename = "int")]
    pub intelligence: i64,
    #[serde(rename = "per")]
    pub perception: i64,
    pub level: i64,
    pub exp: i64,
    pub exp_to_next_level: i64,
    pub ability_points: i64,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            hp: 100,
            mp: 10,
            fatigue: 0,
            strength: 10,
            vitality: 10,
            agility: 10,
            intelligence: 10,
            perception: 10,
            level: 1,
            exp: 0,
            exp_to_next_level: 100,
            ability_points: 0,
        }
    }
}

/// Partial overlay for [`UserStats`]. Absent fields leave the stat
/// untouched; present fields win wholesale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<i64>,
    #[serde(rename = "str", skip_serializing_if = "Option::is_none")]
    pub strength: Option<i64>,
    #[serde(rename = "vit", skip_serializing_if = "Option::is_none")]
    pub vitality: Option<i64>,
    #[serde(rename = "agi", skip_serializing_if = "Option::is_none")]
    pub agility: Option<i64>,
    #[serde(rename = "int", skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<i64>,
    #[serde(rename = "per", skip_serializing_if = "Option::is_none")]
    pub perception: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_to_next_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability_points: Option<i64>,
}

/// The per-user persisted record, keyed by email. Created on first
/// sign-in, mutated in place by quest and stat updates, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub email: String,
    pub name: String,
    pub created_at: String,
    pub stats: UserStats,
    pub quests: Vec<Quest>,
}

impl UserDocument {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            created_at: created_at.into(),
            stats: UserStats::default(),
            quests: vec![default_daily_quest()],
        }
    }
}

/// The quest every new user starts with.
pub fn default_daily_quest() -> Quest {
    Quest {
        id: DEFAULT_DAILY_QUEST_ID.to_string(),
        title: "TRAIN TO BECOME A FORMIDABLE COMBATANT".to_string(),
        tasks: vec![
            QuestTask::new("push-ups", "PUSH-UPS", 100.0, ""),
            QuestTask::new("sit-ups", "SIT-UPS", 100.0, ""),
            QuestTask::new("squats", "SQUATS", 100.0, ""),
            QuestTask::new("run", "RUN", 10.0, "KM"),
        ],
        is_completed: false,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub quest_id: Option<String>,
    pub task_id: Option<String>,
    pub progress: Option<f64>,
    pub is_completed: Option<bool>,
    pub stat_updates: Option<StatPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceQuestsRequest {
    pub quests: Option<Vec<Quest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
}

impl UpdateResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Structured error body. Clients only ever see this shape; internal
/// error detail stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
