//! Response types (Serialize)

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    /// Whether the flag actually transitioned (false on repeat).
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub goal_id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}
