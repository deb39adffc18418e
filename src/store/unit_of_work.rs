/// Transactional save boundary over the entity repositories
use sqlx::sqlite::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::store::entity::{Hashtag, Platform, Post, Profile, Wall};
use crate::store::repository::{apply_staged, Repository};

/// One repository per entity type, resolved as a plain field access.
/// `save` drains every staged mutation into a single transaction.
pub struct UnitOfWork {
    pool: SqlitePool,
    pub platforms: Repository<Platform>,
    pub profiles: Repository<Profile>,
    pub walls: Repository<Wall>,
    pub posts: Repository<Post>,
    pub hashtags: Repository<Hashtag>,
}

impl UnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            platforms: Repository::new(pool.clone()),
            profiles: Repository::new(pool.clone()),
            walls: Repository::new(pool.clone()),
            posts: Repository::new(pool.clone()),
            hashtags: Repository::new(pool.clone()),
            pool,
        }
    }

    /// Commit all staged mutations atomically.
    pub async fn save(&mut self) -> AppResult<()> {
        let platforms = self.platforms.drain();
        let profiles = self.profiles.drain();
        let walls = self.walls.drain();
        let posts = self.posts.drain();
        let hashtags = self.hashtags.drain();

        let total =
            platforms.len() + profiles.len() + walls.len() + posts.len() + hashtags.len();
        if total == 0 {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Parents before children keeps foreign keys satisfied.
        apply_staged(&mut tx, &platforms).await?;
        apply_staged(&mut tx, &hashtags).await?;
        apply_staged(&mut tx, &walls).await?;
        apply_staged(&mut tx, &profiles).await?;
        apply_staged(&mut tx, &posts).await?;

        tx.commit().await.map_err(AppError::Database)?;
        tracing::debug!(mutations = total, "unit of work committed");

        Ok(())
    }

    /// Abandon all staged mutations.
    pub fn discard(&mut self) {
        self.platforms.clear();
        self.profiles.clear();
        self.walls.clear();
        self.posts.clear();
        self.hashtags.clear();
    }
}
