use serde::Serialize;

/// Response header carrying the deletion credential of a new link.
pub const DELETE_WITH_HEADER: &str = "x-delete-with";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
