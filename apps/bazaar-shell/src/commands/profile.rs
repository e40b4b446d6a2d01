//! # Profile Commands
//!
//! The signed-in user's profile: name, contact details, address, bank
//! details and a locally stored profile image.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  profiles table ◄── get_profile / save_profile                          │
//! │                          │                                              │
//! │                          └──► identity provider: display name only      │
//! │                               (best effort, failure is logged)          │
//! │                                                                         │
//! │  <data_dir>/profile_images/<uuid>.<ext> ◄── set_profile_image           │
//! │  profile_images table: user_id → path                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use bazaar_core::validation::validate_profile;
use bazaar_core::Profile;
use bazaar_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::SessionState;

/// Directory under the data dir that holds copied profile images.
pub const PROFILE_IMAGE_DIR: &str = "profile_images";

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Gets the signed-in user's profile, creating it on first access.
pub async fn get_profile(session: &SessionState, db: &Database) -> ApiResult<Profile> {
    let user = session.require_user().await?;
    debug!(uid = %user.uid, "get_profile command");

    Ok(db.profiles().ensure(&Profile::from_auth_user(&user)).await?)
}

/// Saves the profile for the signed-in user.
///
/// `user_id` in the payload is ignored; the session decides whose profile
/// this is.
pub async fn save_profile(
    session: &SessionState,
    db: &Database,
    mut profile: Profile,
) -> ApiResult<Profile> {
    let user = session.require_user().await?;
    profile.user_id = user.uid.clone();
    profile.display_name = profile.display_name.trim().to_string();
    validate_profile(&profile)?;

    let saved = db.profiles().upsert(&profile).await?;
    info!(uid = %saved.user_id, "Profile saved");

    if user.display_name.as_deref() != Some(saved.display_name.as_str()) {
        mirror_display_name(session, &saved.display_name).await;
    }

    Ok(saved)
}

async fn mirror_display_name(session: &SessionState, name: &str) {
    let result = async {
        let token = session.id_token().await?;
        session
            .provider()?
            .update_profile(&token, Some(name), None)
            .await
    }
    .await;

    match result {
        Ok(()) => {
            session
                .update_user(|u| u.display_name = Some(name.to_string()))
                .await;
        }
        Err(e) => warn!(error = %e, "Failed to update display name with identity provider"),
    }
}

/// Copies an image into the app's data dir and records it as the user's
/// profile image. Any previous image file is deleted.
///
/// ## Returns
/// Path of the stored copy.
pub async fn set_profile_image(
    session: &SessionState,
    db: &Database,
    data_dir: &Path,
    source: &Path,
) -> ApiResult<PathBuf> {
    let user = session.require_user().await?;

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| ApiError::validation("Profile image must be a JPEG, PNG or WebP file"))?;

    let dir = data_dir.join(PROFILE_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        tracing::error!(?e, dir = %dir.display(), "Failed to create image directory");
        ApiError::internal("Could not save the image")
    })?;

    let target = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), extension));
    tokio::fs::copy(source, &target).await.map_err(|e| {
        warn!(?e, source = %source.display(), "Failed to copy profile image");
        ApiError::validation("Could not read the selected image")
    })?;

    let previous = db.images().get(&user.uid).await?;
    db.images().set(&user.uid, &target.to_string_lossy()).await?;

    if let Some(old) = previous {
        if let Err(e) = tokio::fs::remove_file(&old).await {
            debug!(?e, path = %old, "Old profile image not removed");
        }
    }

    info!(uid = %user.uid, path = %target.display(), "Profile image updated");
    Ok(target)
}

/// Path of the stored profile image, if one was set.
pub async fn get_profile_image(session: &SessionState, db: &Database) -> ApiResult<Option<PathBuf>> {
    let user = session.require_user().await?;
    Ok(db.images().get(&user.uid).await?.map(PathBuf::from))
}
