/// Domain entities and the trait that lets the generic repository drive them
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{FromRow, Sqlite};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Record timestamps shared by updatable entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct Stamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Deletion is logical only; nothing in the service filters on it.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Stamps {
    /// Stamps for a freshly created record.
    pub fn now() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// A persisted entity the generic repository knows how to read and write.
///
/// `COLUMNS` is the positional bind order, `id` first: the same `bind`
/// implementation serves both `INSERT ... VALUES (?1..?n)` and
/// `UPDATE ... SET c2 = ?2, ... WHERE id = ?1`.
#[async_trait]
pub trait Entity:
    for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Uuid;

    /// Bind this entity's values onto `query` in `COLUMNS` order.
    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Stamp an update. Entities without update timestamps keep the no-op.
    fn touch(&mut self) {}

    /// Load a named relation into this entity. Nested paths are dot
    /// separated, e.g. `"Profiles.Platform"`.
    async fn fetch_relation(&mut self, pool: &SqlitePool, path: &str) -> AppResult<()> {
        let _ = pool;
        Err(AppError::UnknownRelation {
            entity: Self::TABLE,
            path: path.to_string(),
        })
    }
}

/// `SELECT <columns> FROM <table>` for an entity type.
pub(crate) fn select_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

/// Keyed single-row lookup.
pub(crate) async fn fetch_by_id<E: Entity>(pool: &SqlitePool, id: Uuid) -> AppResult<Option<E>> {
    let sql = format!("{} WHERE id = ?1", select_sql::<E>());
    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
}

/// Rows of `E` reached through a join table, e.g. profiles of a wall.
pub(crate) async fn fetch_via_join<E: Entity>(
    pool: &SqlitePool,
    join_table: &str,
    owner_column: &str,
    related_column: &str,
    owner_id: Uuid,
) -> AppResult<Vec<E>> {
    let columns = E::COLUMNS
        .iter()
        .map(|c| format!("t.{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {} FROM {} t JOIN {} j ON j.{} = t.id WHERE j.{} = ?1",
        columns,
        E::TABLE,
        join_table,
        related_column,
        owner_column,
    );
    sqlx::query_as::<_, E>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
}

/// Split an eager-load path into its first segment and the remainder.
fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Social network service posts are fetched from. (Instagram, Twitter, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Platform {
    pub id: Uuid,
    pub name: String,
    pub app_id: Option<String>,
    pub api_endpoint: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamps: Stamps,
}

#[async_trait]
impl Entity for Platform {
    const TABLE: &'static str = "platforms";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "app_id",
        "api_endpoint",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.app_id)
            .bind(&self.api_endpoint)
            .bind(self.stamps.created_at)
            .bind(self.stamps.updated_at)
            .bind(self.stamps.deleted_at)
    }

    fn touch(&mut self) {
        self.stamps.updated_at = Some(Utc::now());
    }
}

/// A user's account on a platform, with the access token used to pull posts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub platform_id: Uuid,
    pub profile_handle: String,
    pub platform_user_id: Option<String>,
    pub token: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamps: Stamps,
    #[sqlx(skip)]
    pub platform: Option<Platform>,
}

#[async_trait]
impl Entity for Profile {
    const TABLE: &'static str = "profiles";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "platform_id",
        "profile_handle",
        "platform_user_id",
        "token",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id)
            .bind(self.platform_id)
            .bind(&self.profile_handle)
            .bind(&self.platform_user_id)
            .bind(&self.token)
            .bind(self.stamps.created_at)
            .bind(self.stamps.updated_at)
            .bind(self.stamps.deleted_at)
    }

    fn touch(&mut self) {
        self.stamps.updated_at = Some(Utc::now());
    }

    async fn fetch_relation(&mut self, pool: &SqlitePool, path: &str) -> AppResult<()> {
        let (head, rest) = split_path(path);
        match head {
            "Platform" => {
                let mut platform = fetch_by_id::<Platform>(pool, self.platform_id).await?;
                if let (Some(platform), Some(rest)) = (platform.as_mut(), rest) {
                    platform.fetch_relation(pool, rest).await?;
                }
                self.platform = platform;
                Ok(())
            }
            _ => Err(AppError::UnknownRelation {
                entity: Self::TABLE,
                path: path.to_string(),
            }),
        }
    }
}

/// A display wall aggregating posts from selected profiles and hashtags.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wall {
    pub id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamps: Stamps,
    #[sqlx(skip)]
    pub profiles: Vec<Profile>,
    #[sqlx(skip)]
    pub hashtags: Vec<Hashtag>,
}

#[async_trait]
impl Entity for Wall {
    const TABLE: &'static str = "walls";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "created_at", "updated_at", "deleted_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(self.stamps.created_at)
            .bind(self.stamps.updated_at)
            .bind(self.stamps.deleted_at)
    }

    fn touch(&mut self) {
        self.stamps.updated_at = Some(Utc::now());
    }

    async fn fetch_relation(&mut self, pool: &SqlitePool, path: &str) -> AppResult<()> {
        let (head, rest) = split_path(path);
        match head {
            "Profiles" => {
                let mut profiles = fetch_via_join::<Profile>(
                    pool,
                    "walls_profiles",
                    "wall_id",
                    "profile_id",
                    self.id,
                )
                .await?;
                if let Some(rest) = rest {
                    for profile in &mut profiles {
                        profile.fetch_relation(pool, rest).await?;
                    }
                }
                self.profiles = profiles;
                Ok(())
            }
            "Hashtags" => {
                let mut hashtags = fetch_via_join::<Hashtag>(
                    pool,
                    "walls_hashtags",
                    "wall_id",
                    "hashtag_id",
                    self.id,
                )
                .await?;
                if let Some(rest) = rest {
                    for hashtag in &mut hashtags {
                        hashtag.fetch_relation(pool, rest).await?;
                    }
                }
                self.hashtags = hashtags;
                Ok(())
            }
            _ => Err(AppError::UnknownRelation {
                entity: Self::TABLE,
                path: path.to_string(),
            }),
        }
    }
}

/// An approved social media post. Create-only, no update timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub url: String,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub platform_id: Uuid,
    pub platform_post_id: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub platform: Option<Platform>,
    #[sqlx(skip)]
    pub hashtags: Vec<Hashtag>,
}

#[async_trait]
impl Entity for Post {
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "url",
        "likes",
        "comments",
        "platform_id",
        "platform_post_id",
        "posted_at",
        "created_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.url)
            .bind(self.likes)
            .bind(self.comments)
            .bind(self.platform_id)
            .bind(&self.platform_post_id)
            .bind(self.posted_at)
            .bind(self.created_at)
    }

    async fn fetch_relation(&mut self, pool: &SqlitePool, path: &str) -> AppResult<()> {
        let (head, rest) = split_path(path);
        match head {
            "Platform" => {
                let mut platform = fetch_by_id::<Platform>(pool, self.platform_id).await?;
                if let (Some(platform), Some(rest)) = (platform.as_mut(), rest) {
                    platform.fetch_relation(pool, rest).await?;
                }
                self.platform = platform;
                Ok(())
            }
            "Hashtags" => {
                self.hashtags = fetch_via_join::<Hashtag>(
                    pool,
                    "posts_hashtags",
                    "post_id",
                    "hashtag_id",
                    self.id,
                )
                .await?;
                Ok(())
            }
            _ => Err(AppError::UnknownRelation {
                entity: Self::TABLE,
                path: path.to_string(),
            }),
        }
    }
}

/// Hashtag used to pull associated posts onto walls.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hashtag {
    pub id: Uuid,
    pub tag: String,
    pub platform_hashtag_id: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamps: Stamps,
}

#[async_trait]
impl Entity for Hashtag {
    const TABLE: &'static str = "hashtags";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tag",
        "platform_hashtag_id",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.tag)
            .bind(&self.platform_hashtag_id)
            .bind(self.stamps.created_at)
            .bind(self.stamps.updated_at)
            .bind(self.stamps.deleted_at)
    }

    fn touch(&mut self) {
        self.stamps.updated_at = Some(Utc::now());
    }
}
