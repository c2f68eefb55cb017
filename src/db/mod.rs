pub mod entities;
pub mod task_repo;
