use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{program_course, role, role_permission, student_mark, user};
use crate::utils::hash;

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &[role::ADMIN_ROLE, role::TEACHER_ROLE];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: structure management plus everything a teacher can do
    ("admin", "program:manage"),
    ("admin", "course:manage"),
    ("admin", "class:manage"),
    ("admin", "student:manage"),
    ("admin", "user:invite"),
    ("admin", "clo:manage"),
    ("admin", "assessment:manage"),
    ("admin", "grade:enter"),
    // Teacher: outcome and grading work within assigned courses
    ("teacher", "clo:manage"),
    ("teacher", "assessment:manage"),
    ("teacher", "grade:enter"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Create the bootstrap admin account if no user holds that email yet.
///
/// The password comes from configuration, so the account is considered
/// already set up and `is_first_login` stays false.
pub async fn seed_admin_user(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&config.auth.admin_email))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let password_hash = hash::hash_password(&config.auth.admin_password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;

    let result = user::Entity::insert(user::ActiveModel {
        email: Set(config.auth.admin_email.clone()),
        password: Set(password_hash),
        full_name: Set("Administrator".to_string()),
        role: Set(role::ADMIN_ROLE.to_string()),
        is_first_login: Set(false),
        token_version: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        sea_orm::sea_query::OnConflict::column(user::Column::Email)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await;

    match result {
        Ok(_) => {
            info!(email = %config.auth.admin_email, "Seeded bootstrap admin user");
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Study-plan listing: filter by program, order by semester
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_program_course_program_semester")
        .table(program_course::Entity)
        .col(program_course::Column::ProgramId)
        .col(program_course::Column::Semester)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_program_course_program_semester exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_program_course_program_semester: {}",
                e
            );
        }
    }

    // Marks are fetched per assessment via its question ids; the composite
    // primary key leads with student_id and doesn't cover this.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_student_mark_question")
        .table(student_mark::Entity)
        .col(student_mark::Column::QuestionId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_student_mark_question exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_student_mark_question: {}", e);
        }
    }

    Ok(())
}
