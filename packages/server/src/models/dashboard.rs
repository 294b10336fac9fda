use sea_orm::FromQueryResult;
use serde::Serialize;

/// Aggregate entity counts for the admin dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub programs: u64,
    pub courses: u64,
    pub classes: u64,
    pub students: u64,
    pub teachers: u64,
    /// Student head-count per intake batch.
    pub students_per_batch: Vec<BatchCount>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct BatchCount {
    pub batch: String,
    pub count: i64,
}
