use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{describe_relationship, ExistingPerson, Person, PersonStore, Relationship, RelationshipType};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed person store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store backed by the file in `config`
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create a store on a private in-memory database.
    ///
    /// The pool is pinned to a single long-lived connection; every new
    /// connection to `:memory:` would otherwise see an empty database.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every relationship row, oldest first
    pub async fn relationships(&self) -> StorageResult<Vec<Relationship>> {
        let rows: Vec<RelationshipRow> = sqlx::query_as(
            r#"
            SELECT id, person_id, related_person_id, type AS relationship_type, created_at
            FROM relationship
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Relationship::try_from).collect()
    }

    async fn find_person(&self, full_name: &str, birth_year: i32) -> StorageResult<Option<Person>> {
        let row: Option<PersonRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, birth_year
            FROM person
            WHERE full_name = ? AND birth_year = ?
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(full_name)
        .bind(birth_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_symmetric(
        &self,
        a: &str,
        b: &str,
        relationship_type: RelationshipType,
    ) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_relationship(&mut tx, &Relationship::new(a, b, relationship_type)).await?;
        insert_relationship(&mut tx, &Relationship::new(b, a, relationship_type)).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Insert one relationship row; an identical existing row is left untouched.
async fn insert_relationship(conn: &mut SqliteConnection, row: &Relationship) -> StorageResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO relationship (id, person_id, related_person_id, type, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (person_id, related_person_id, type) DO NOTHING
        "#,
    )
    .bind(&row.id)
    .bind(&row.person_id)
    .bind(&row.related_person_id)
    .bind(row.relationship_type.as_str())
    .bind(row.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        debug!(
            person_id = %row.person_id,
            related_person_id = %row.related_person_id,
            relationship_type = %row.relationship_type,
            "Relationship already exists, skipping duplicate"
        );
    }

    Ok(())
}

#[async_trait]
impl PersonStore for SqliteStore {
    async fn check_existing_person(
        &self,
        full_name: &str,
        birth_year: i32,
    ) -> StorageResult<Option<ExistingPerson>> {
        let Some(person) = self.find_person(full_name, birth_year).await? else {
            return Ok(None);
        };

        let rows: Vec<RelatedRow> = sqlx::query_as(
            r#"
            SELECT r.type AS relationship_type, p.id, p.full_name, p.birth_year
            FROM relationship r
            JOIN person p ON p.id = r.person_id
            WHERE r.related_person_id = ?
            ORDER BY r.created_at ASC, r.rowid ASC
            "#,
        )
        .bind(&person.id)
        .fetch_all(&self.pool)
        .await?;

        let mut relationships = Vec::with_capacity(rows.len());
        for row in rows {
            match RelationshipType::from_str(&row.relationship_type) {
                Ok(kind) => {
                    let other = Person {
                        id: row.id,
                        full_name: row.full_name,
                        birth_year: row.birth_year,
                    };
                    relationships.push(describe_relationship(kind, &other));
                }
                Err(e) => warn!(error = %e, person_id = %person.id, "Skipping unreadable relationship row"),
            }
        }

        Ok(Some(ExistingPerson {
            person,
            relationships,
        }))
    }

    async fn find_or_create_person(
        &self,
        full_name: &str,
        birth_year: i32,
    ) -> StorageResult<Person> {
        if let Some(person) = self.find_person(full_name, birth_year).await? {
            return Ok(person);
        }

        let person = Person::new(full_name, birth_year);
        sqlx::query(
            r#"
            INSERT INTO person (id, full_name, birth_year, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&person.id)
        .bind(&person.full_name)
        .bind(person.birth_year)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(person_id = %person.id, full_name = %full_name, "Created person");
        Ok(person)
    }

    async fn get_person(&self, id: &str) -> StorageResult<Option<Person>> {
        let row: Option<PersonRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, birth_year
            FROM person
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn link_parent(&self, child_id: &str, parent_id: &str) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_relationship(
            &mut conn,
            &Relationship::new(child_id, parent_id, RelationshipType::Parent),
        )
        .await
    }

    async fn link_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_relationship(
            &mut conn,
            &Relationship::new(parent_id, child_id, RelationshipType::Child),
        )
        .await
    }

    async fn link_spouse(&self, person_id: &str, spouse_id: &str) -> StorageResult<()> {
        self.insert_symmetric(person_id, spouse_id, RelationshipType::Spouse)
            .await
    }

    async fn link_sibling(&self, person_id: &str, sibling_id: &str) -> StorageResult<()> {
        self.insert_symmetric(person_id, sibling_id, RelationshipType::Sibling)
            .await
    }

    async fn related_people(
        &self,
        person_id: &str,
        relationship_type: RelationshipType,
    ) -> StorageResult<Vec<Person>> {
        let rows: Vec<PersonRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.full_name, p.birth_year
            FROM relationship r
            JOIN person p ON p.id = r.related_person_id
            WHERE r.person_id = ? AND r.type = ?
            ORDER BY r.created_at ASC, r.rowid ASC
            "#,
        )
        .bind(person_id)
        .bind(relationship_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn link_parent_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_relationship(
            &mut tx,
            &Relationship::new(child_id, parent_id, RelationshipType::Parent),
        )
        .await?;
        insert_relationship(
            &mut tx,
            &Relationship::new(parent_id, child_id, RelationshipType::Child),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PersonRow {
    id: String,
    full_name: String,
    birth_year: i32,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            birth_year: row.birth_year,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RelatedRow {
    relationship_type: String,
    id: String,
    full_name: String,
    birth_year: i32,
}

#[derive(sqlx::FromRow)]
struct RelationshipRow {
    id: String,
    person_id: String,
    related_person_id: String,
    relationship_type: String,
    created_at: String,
}

impl TryFrom<RelationshipRow> for Relationship {
    type Error = StorageError;

    fn try_from(row: RelationshipRow) -> Result<Self, Self::Error> {
        use chrono::DateTime;

        let relationship_type =
            RelationshipType::from_str(&row.relationship_type).map_err(|message| StorageError::Query {
                message,
            })?;

        Ok(Self {
            id: row.id,
            person_id: row.person_id,
            related_person_id: row.related_person_id,
            relationship_type,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
