use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, Statement,
    TransactionTrait,
    prelude::DateTimeWithTimeZone,
};

use super::entities::prelude::Task;
use super::entities::task;

/// Field set for an insert; defaults have already been applied by the caller.
#[derive(Debug)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Merge patch for an update. `None` means "leave the stored value alone";
/// `description` distinguishes an explicit null from an absent key.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

pub async fn list_tasks(db: &DatabaseConnection) -> Result<Vec<task::Model>, sea_orm::DbErr> {
    // Newest first; id breaks created_at ties deterministically.
    Task::find()
        .order_by_desc(task::Column::CreatedAt)
        .order_by_desc(task::Column::Id)
        .all(db)
        .await
}

pub async fn create_task(
    db: &DatabaseConnection,
    new: NewTask,
) -> Result<task::Model, sea_orm::DbErr> {
    // One `now` for both columns so created_at == updated_at on a fresh row.
    let now = Utc::now().fixed_offset();
    let model = task::ActiveModel {
        title: Set(new.title),
        description: Set(new.description),
        completed: Set(new.completed),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn find_task(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<task::Model>, sea_orm::DbErr> {
    Task::find_by_id(id).one(db).await
}

pub async fn update_task(
    db: &DatabaseConnection,
    id: i32,
    changes: TaskChanges,
) -> Result<Option<task::Model>, sea_orm::DbErr> {
    let txn = db.begin().await?;
    let Some(existing) = Task::find_by_id(id).one(&txn).await? else {
        txn.rollback().await?;
        return Ok(None);
    };
    let mut active: task::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(completed) = changes.completed {
        active.completed = Set(completed);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(Some(updated))
}

pub async fn delete_task(db: &DatabaseConnection, id: i32) -> Result<bool, sea_orm::DbErr> {
    let result = Task::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Trivial round-trip used by the health check; returns the store's clock.
pub async fn store_timestamp(
    db: &DatabaseConnection,
) -> Result<DateTimeWithTimeZone, sea_orm::DbErr> {
    let stmt = Statement::from_string(
        db.get_database_backend(),
        "SELECT CURRENT_TIMESTAMP AS now",
    );
    let row = db
        .query_one(stmt)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("health probe returned no row".into()))?;
    row.try_get::<DateTimeWithTimeZone>("", "now")
}
