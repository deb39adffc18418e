/// Platform CRUD service
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{Platform, UnitOfWork};

/// Transfer object for a platform
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDto {
    pub id: Uuid,
    #[validate(length(min = 1, max = 64, message = "Name is required, at most 64 characters."))]
    pub name: String,
    #[validate(length(max = 64, message = "App id is at most 64 characters."))]
    pub app_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 512,
        message = "API endpoint is required, at most 512 characters."
    ))]
    pub api_endpoint: String,
}

impl From<&Platform> for PlatformDto {
    fn from(platform: &Platform) -> Self {
        Self {
            id: platform.id,
            name: platform.name.clone(),
            app_id: platform.app_id.clone(),
            api_endpoint: platform.api_endpoint.clone(),
        }
    }
}

/// Handles all platform operations
pub struct PlatformService {
    pool: SqlitePool,
}

impl PlatformService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single platform by id.
    pub async fn get_platform(&self, id: Uuid) -> AppResult<PlatformDto> {
        let uow = UnitOfWork::new(self.pool.clone());
        let platform = uow
            .platforms
            .get_by_id(id, &[])
            .await?
            .ok_or_else(|| AppError::NotFound("Platform record cannot be found.".to_string()))?;
        Ok(PlatformDto::from(&platform))
    }

    /// All platforms.
    pub async fn list_platforms(&self) -> AppResult<Vec<PlatformDto>> {
        let uow = UnitOfWork::new(self.pool.clone());
        let platforms = uow.platforms.get_all().await?;
        Ok(platforms.iter().map(PlatformDto::from).collect())
    }

    /// Overwrite a platform's scalar fields and return the committed view.
    pub async fn update_platform(&self, dto: &PlatformDto) -> AppResult<PlatformDto> {
        let mut uow = UnitOfWork::new(self.pool.clone());
        let mut platform = uow
            .platforms
            .get_by_id(dto.id, &[])
            .await?
            .ok_or_else(|| AppError::NotFound("Platform record cannot be found.".to_string()))?;

        platform.name = dto.name.clone();
        platform.app_id = dto.app_id.clone();
        platform.api_endpoint = dto.api_endpoint.clone();

        uow.platforms.update(platform);
        uow.save().await?;

        self.get_platform(dto.id).await
    }
}
