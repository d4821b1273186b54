use sqlx::{Pool, Postgres};

use crate::credential::types::{CredentialRecord, Identity};
use crate::storage::{StorageError, validate_postgres_table_schema};

// PostgreSQL implementations
pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
    table: &str,
) -> Result<(), StorageError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            webauthn_user_id TEXT,
            webauthn_displayname TEXT,
            webauthn_credential_id TEXT,
            webauthn_credential_public_key TEXT,
            webauthn_sign_count BIGINT NOT NULL DEFAULT 0,
            webauthn_backup_eligible BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_tables_postgres(
    pool: &Pool<Postgres>,
    table: &str,
) -> Result<(), StorageError> {
    let expected_columns = [
        ("id", "text"),
        ("username", "text"),
        ("webauthn_user_id", "text"),
        ("webauthn_displayname", "text"),
        ("webauthn_credential_id", "text"),
        ("webauthn_credential_public_key", "text"),
        ("webauthn_sign_count", "bigint"),
        ("webauthn_backup_eligible", "boolean"),
        ("created_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(pool, table, &expected_columns).await
}

pub(super) async fn insert_identity_postgres(
    pool: &Pool<Postgres>,
    table: &str,
    identity: &Identity,
) -> Result<(), StorageError> {
    sqlx::query(&format!(
        r#"
        INSERT INTO {table} (id, username, webauthn_sign_count, webauthn_backup_eligible, created_at)
        VALUES ($1, $2, 0, FALSE, $3)
        "#
    ))
    .bind(&identity.id)
    .bind(&identity.username)
    .bind(identity.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_identity_postgres(
    pool: &Pool<Postgres>,
    table: &str,
    username: &str,
) -> Result<Option<Identity>, StorageError> {
    let identity = sqlx::query_as::<_, Identity>(&format!(
        r#"SELECT * FROM {table} WHERE username = $1"#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(identity)
}

pub(super) async fn save_credential_postgres(
    pool: &Pool<Postgres>,
    table: &str,
    username: &str,
    record: &CredentialRecord,
) -> Result<bool, StorageError> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {table}
        SET webauthn_user_id = $1,
            webauthn_displayname = $2,
            webauthn_credential_id = $3,
            webauthn_credential_public_key = $4,
            webauthn_sign_count = $5,
            webauthn_backup_eligible = $6
        WHERE username = $7
        "#
    ))
    .bind(&record.user_handle)
    .bind(&record.display_name)
    .bind(&record.credential_id)
    .bind(&record.public_key)
    .bind(i64::from(record.sign_count))
    .bind(record.backup_eligible)
    .bind(username)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn update_sign_count_postgres(
    pool: &Pool<Postgres>,
    table: &str,
    username: &str,
    sign_count: u32,
) -> Result<bool, StorageError> {
    let result = sqlx::query(&format!(
        r#"UPDATE {table} SET webauthn_sign_count = $1 WHERE username = $2"#
    ))
    .bind(i64::from(sign_count))
    .bind(username)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
