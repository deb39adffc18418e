/// Profile CRUD service
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::platform::PlatformDto;
use crate::store::{Profile, Stamps, UnitOfWork};

/// Transfer object for a profile with its eager-loaded platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: Uuid,
    pub profile_handle: String,
    pub platform_user_id: Option<String>,
    pub token: String,
    pub platform: PlatformDto,
}

/// Payload for creating a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub platform_id: Uuid,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Profile handle is required, at most 64 characters."
    ))]
    pub profile_handle: String,
    #[validate(length(max = 64, message = "Platform user id is at most 64 characters."))]
    pub platform_user_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 512,
        message = "Access token is required, at most 512 characters."
    ))]
    pub token: String,
}

/// Payload for updating a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub id: Uuid,
    pub platform_id: Uuid,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Profile handle is required, at most 64 characters."
    ))]
    pub profile_handle: String,
    #[validate(length(max = 64, message = "Platform user id is at most 64 characters."))]
    pub platform_user_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 512,
        message = "Access token is required, at most 512 characters."
    ))]
    pub token: String,
}

/// Handles all profile operations
pub struct ProfileService {
    pool: SqlitePool,
}

impl ProfileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a profile. The referenced platform must exist; nothing is
    /// written otherwise.
    pub async fn create_profile(&self, req: &CreateProfileRequest) -> AppResult<ProfileDto> {
        let mut uow = UnitOfWork::new(self.pool.clone());

        uow.platforms
            .get_by_id(req.platform_id, &[])
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Platform record could not be found for the provided platform id.".to_string(),
                )
            })?;

        let profile = Profile {
            id: Uuid::new_v4(),
            platform_id: req.platform_id,
            profile_handle: req.profile_handle.clone(),
            platform_user_id: req.platform_user_id.clone(),
            token: req.token.clone(),
            stamps: Stamps::now(),
            platform: None,
        };
        let id = profile.id;

        uow.profiles.add(profile);
        uow.save().await?;

        self.get_profile(id).await
    }

    /// Single profile by id with its platform eager-loaded.
    pub async fn get_profile(&self, id: Uuid) -> AppResult<ProfileDto> {
        let uow = UnitOfWork::new(self.pool.clone());
        let profile = uow
            .profiles
            .get_by_id(id, &["Platform"])
            .await?
            .ok_or_else(|| AppError::NotFound("Profile record cannot be found.".to_string()))?;

        let platform = profile.platform.as_ref().ok_or_else(|| {
            AppError::NotFound("Associated platform cannot be found for the profile.".to_string())
        })?;

        Ok(ProfileDto {
            id: profile.id,
            profile_handle: profile.profile_handle.clone(),
            platform_user_id: profile.platform_user_id.clone(),
            token: profile.token.clone(),
            platform: PlatformDto::from(platform),
        })
    }

    /// Overwrite a profile's scalar fields and return the committed view.
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> AppResult<ProfileDto> {
        let mut uow = UnitOfWork::new(self.pool.clone());

        uow.platforms
            .get_by_id(req.platform_id, &[])
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Platform record could not be found for the provided platform id.".to_string(),
                )
            })?;

        let mut profile = uow
            .profiles
            .get_by_id(req.id, &[])
            .await?
            .ok_or_else(|| AppError::NotFound("Profile record cannot be found.".to_string()))?;

        profile.profile_handle = req.profile_handle.clone();
        profile.platform_user_id = req.platform_user_id.clone();
        profile.token = req.token.clone();
        profile.platform_id = req.platform_id;

        uow.profiles.update(profile);
        uow.save().await?;

        self.get_profile(req.id).await
    }
}
