//! PostgreSQL 저장소.
//!
//! `database.url`이 설정된 경우에만 사용됩니다. 설정이 없으면
//! `authgate_core::InMemoryUserStore`가 대신 쓰입니다.

pub mod users;

pub use users::{run_migrations, PgUserStore, UserRow};
