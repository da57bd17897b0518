use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppResult;

pub async fn init() -> anyhow::Result<SqlitePool> {
	let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;

	let options = SqliteConnectOptions::from_str(&database_url)
		.context("invalid DATABASE_URL")?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await
		.context("failed to connect to database")?;

	sqlx::migrate!()
		.run(&pool)
		.await
		.context("failed to run migrations")?;

	Ok(pool)
}

/// A group of writes that commit together or not at all.
///
/// Wraps a database transaction. [`UnitOfWork::commit`] consumes the value, so
/// it can be committed at most once; if it is dropped on any other path (an
/// early `?` return, a panic) the transaction is rolled back.
pub struct UnitOfWork {
	tx: Transaction<'static, Sqlite>,
	label: &'static str,
}

impl UnitOfWork {
	pub async fn begin(pool: &SqlitePool, label: &'static str) -> AppResult<Self> {
		let tx = pool.begin().await?;
		tracing::debug!(unit = label, "unit of work started");
		Ok(Self { tx, label })
	}

	pub fn conn(&mut self) -> &mut SqliteConnection {
		&mut self.tx
	}

	pub async fn commit(self) -> AppResult<()> {
		self.tx.commit().await?;
		tracing::debug!(unit = self.label, "unit of work committed");
		Ok(())
	}

	pub async fn rollback(self) -> AppResult<()> {
		self.tx.rollback().await?;
		tracing::debug!(unit = self.label, "unit of work rolled back");
		Ok(())
	}
}
