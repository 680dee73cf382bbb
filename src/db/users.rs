use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// A registered user. The password column holds an Argon2 PHC string, never
/// the plain password.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("schema.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}

pub async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(|row| -> Result<UserRecord, sqlx::Error> {
        Ok(UserRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
        })
    })
    .transpose()
}

/// Insert a user. A second account for the same email fails with a unique
/// violation, see [`is_duplicate_email`].
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<UserRecord, sqlx::Error> {
    let created_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, password, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&created_at)
    .execute(pool)
    .await?;

    Ok(UserRecord {
        id: result.last_insert_rowid(),
        name: user.name.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        created_at,
    })
}

pub fn is_duplicate_email(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_db(&pool).await.unwrap();
        pool
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn created_user_can_be_found_by_email() {
        let pool = memory_pool().await;
        let created = create_user(&pool, &new_user("ada@example.com")).await.unwrap();

        let found = find_user_by_email(&pool, "ada@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Ada");
        assert_eq!(found.password_hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let pool = memory_pool().await;
        assert!(find_user_by_email(&pool, "nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = memory_pool().await;
        create_user(&pool, &new_user("ada@example.com")).await.unwrap();

        let err = create_user(&pool, &new_user("ada@example.com")).await.unwrap_err();
        assert!(is_duplicate_email(&err));
    }
}
