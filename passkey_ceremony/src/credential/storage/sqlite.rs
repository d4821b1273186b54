use sqlx::{Pool, Sqlite};

use crate::credential::types::{CredentialRecord, Identity};
use crate::storage::{StorageError, validate_sqlite_table_schema};

// SQLite implementations
pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
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
            webauthn_sign_count INTEGER NOT NULL DEFAULT 0,
            webauthn_backup_eligible BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_tables_sqlite(
    pool: &Pool<Sqlite>,
    table: &str,
) -> Result<(), StorageError> {
    let expected_columns = [
        ("id", "TEXT"),
        ("username", "TEXT"),
        ("webauthn_user_id", "TEXT"),
        ("webauthn_displayname", "TEXT"),
        ("webauthn_credential_id", "TEXT"),
        ("webauthn_credential_public_key", "TEXT"),
        ("webauthn_sign_count", "INTEGER"),
        ("webauthn_backup_eligible", "BOOLEAN"),
        ("created_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, table, &expected_columns).await
}

pub(super) async fn insert_identity_sqlite(
    pool: &Pool<Sqlite>,
    table: &str,
    identity: &Identity,
) -> Result<(), StorageError> {
    sqlx::query(&format!(
        r#"
        INSERT INTO {table} (id, username, webauthn_sign_count, webauthn_backup_eligible, created_at)
        VALUES (?, ?, 0, FALSE, ?)
        "#
    ))
    .bind(&identity.id)
    .bind(&identity.username)
    .bind(identity.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_identity_sqlite(
    pool: &Pool<Sqlite>,
    table: &str,
    username: &str,
) -> Result<Option<Identity>, StorageError> {
    let identity = sqlx::query_as::<_, Identity>(&format!(
        r#"SELECT * FROM {table} WHERE username = ?"#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(identity)
}

pub(super) async fn save_credential_sqlite(
    pool: &Pool<Sqlite>,
    table: &str,
    username: &str,
    record: &CredentialRecord,
) -> Result<bool, StorageError> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {table}
        SET webauthn_user_id = ?,
            webauthn_displayname = ?,
            webauthn_credential_id = ?,
            webauthn_credential_public_key = ?,
            webauthn_sign_count = ?,
            webauthn_backup_eligible = ?
        WHERE username = ?
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

pub(super) async fn update_sign_count_sqlite(
    pool: &Pool<Sqlite>,
    table: &str,
    username: &str,
    sign_count: u32,
) -> Result<bool, StorageError> {
    let result = sqlx::query(&format!(
        r#"UPDATE {table} SET webauthn_sign_count = ? WHERE username = ?"#
    ))
    .bind(i64::from(sign_count))
    .bind(username)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
