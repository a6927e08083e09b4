//! Request logic behind the HTTP handlers.
//!
//! Handlers extract the caller and the body, then call into here. Nothing
//! in this module knows about HTTP beyond returning [`ApiError`].

use emojigen_types::{
    EmojiWithLike, GenerateRequest, GenerateResponse, LikeRequest, LikeResponse, NewEmoji,
    Profile, UserId,
};
use emojigen_storage::ImageAsset;
use tracing::{info, warn};
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller's profile, created with default credits on first access.
pub async fn get_profile(state: &AppState, caller: &UserId) -> Result<Profile, ApiError> {
    Ok(state.store.get_or_create_profile(caller).await?)
}

/// Every emoji, newest first, flagged with whether `caller` likes it.
pub async fn list_emojis(
    state: &AppState,
    caller: &UserId,
) -> Result<Vec<EmojiWithLike>, ApiError> {
    Ok(state.store.list_emojis_for(caller).await?)
}

/// Generate, persist and record one emoji, spending one credit.
///
/// Order matters: credits are checked before the prompt is looked at, and
/// nothing is inserted or debited unless the image has been stored.
pub async fn generate_emoji(
    state: &AppState,
    caller: &UserId,
    request: &GenerateRequest,
) -> Result<GenerateResponse, ApiError> {
    let profile = state.store.get_or_create_profile(caller).await?;
    if !profile.has_credits() {
        return Err(ApiError::InsufficientCredits);
    }

    let prompt = validated_prompt(request)?;
    info!(
        user_id = %caller,
        prompt,
        backend = state.images.name(),
        credits = profile.credits,
        "Generating emoji"
    );

    let image = state.images.generate(prompt).await?;
    let kind = image.kind();
    let bytes = state.images.fetch_bytes(image).await?;

    let asset = ImageAsset::png(bytes);
    let url = state.assets.upload(&asset).await?;
    info!(
        path = asset.path,
        output = kind,
        storage = state.assets.name(),
        "Stored generated image"
    );

    let emoji = state
        .store
        .insert_emoji(&NewEmoji {
            image_url: url,
            prompt: prompt.to_owned(),
            creator_user_id: caller.clone(),
        })
        .await?;

    // The emoji row stays even if the debit does not happen.
    match state.store.debit_credit(caller).await {
        Ok(Some(remaining)) => {
            info!(user_id = %caller, emoji_id = %emoji.id, remaining, "Credit spent");
        }
        Ok(None) => {
            warn!(user_id = %caller, emoji_id = %emoji.id, "No credit left to debit after insert");
        }
        Err(e) => {
            warn!(user_id = %caller, emoji_id = %emoji.id, error = %e, "Credit debit failed after insert");
        }
    }

    Ok(GenerateResponse {
        url: emoji.image_url,
        id: emoji.id,
    })
}

/// Like or unlike an emoji and return its new count.
pub async fn set_like(
    state: &AppState,
    caller: &UserId,
    request: LikeRequest,
) -> Result<LikeResponse, ApiError> {
    let emoji_id = request.emoji_id;
    if state.store.get_emoji(emoji_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("emoji {emoji_id}")));
    }

    let likes_count = if request.liked {
        if !state.store.insert_like(caller, emoji_id).await? {
            return Err(ApiError::AlreadyLiked(emoji_id.into_inner()));
        }
        state.store.increment_likes(emoji_id).await?
    } else {
        let removed = state.store.delete_like(caller, emoji_id).await?;
        if !removed {
            info!(user_id = %caller, %emoji_id, "Unlike without an existing like");
        }
        state.store.decrement_likes(emoji_id).await?
    };

    info!(user_id = %caller, %emoji_id, liked = request.liked, likes_count, "Like updated");

    Ok(LikeResponse {
        likes_count,
        liked: request.liked,
    })
}

fn validated_prompt(request: &GenerateRequest) -> Result<&str, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(format!("prompt: {e}")))?;
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::InvalidRequest("prompt must not be blank".to_owned()));
    }
    Ok(prompt)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emojigen_db::MemoryStore;
    use emojigen_inference::{FixedBackend, ImageBackend};
    use emojigen_storage::{AssetStore, MemoryStorage};
    use emojigen_types::EmojiId;

    use super::*;
    use crate::auth::Authenticator;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn state(images: ImageBackend) -> (AppState, MemoryStore, MemoryStorage) {
        let store = MemoryStore::new();
        let assets = MemoryStorage::new("https://cdn.test");
        let state = AppState::new(
            store.clone().into(),
            images,
            AssetStore::Memory(assets.clone()),
            Authenticator::trusted_header(),
        );
        (state, store, assets)
    }

    fn fixed() -> ImageBackend {
        ImageBackend::Fixed(FixedBackend::new(serde_json::json!([PNG])))
    }

    fn prompt(text: &str) -> GenerateRequest {
        GenerateRequest {
            prompt: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn generation_spends_exactly_one_credit() {
        let (state, store, assets) = state(fixed());
        let user = UserId::from("u1");

        let response = generate_emoji(&state, &user, &prompt("a cat")).await.unwrap();
        assert!(response.url.starts_with("https://cdn.test/public/"));
        assert_eq!(store.get_profile(&user).await.unwrap().credits, 2);
        assert_eq!(assets.len().await, 1);

        let emoji = store.get_emoji(response.id).await.unwrap();
        assert_eq!(emoji.likes_count, 0);
        assert_eq!(emoji.prompt, "a cat");
    }

    #[tokio::test]
    async fn no_credits_means_no_generation() {
        let (state, store, assets) = state(fixed());
        let user = UserId::from("broke");
        for _ in 0..3 {
            generate_emoji(&state, &user, &prompt("dog")).await.unwrap();
        }

        let result = generate_emoji(&state, &user, &prompt("dog")).await;
        assert!(matches!(result, Err(ApiError::InsufficientCredits)));
        assert_eq!(store.list_emojis_for(&user).await.len(), 3);
        assert_eq!(assets.len().await, 3);
        assert_eq!(store.get_profile(&user).await.unwrap().credits, 0);
    }

    #[tokio::test]
    async fn blank_and_oversized_prompts_are_rejected() {
        let (state, store, _) = state(fixed());
        let user = UserId::from("u1");

        let blank = generate_emoji(&state, &user, &prompt("   ")).await;
        assert!(matches!(blank, Err(ApiError::InvalidRequest(_))));

        let long = generate_emoji(&state, &user, &prompt(&"x".repeat(501))).await;
        assert!(matches!(long, Err(ApiError::InvalidRequest(_))));

        assert_eq!(store.get_profile(&user).await.unwrap().credits, 3);
    }

    #[tokio::test]
    async fn failed_inference_leaves_no_trace() {
        let failing = ImageBackend::Fixed(FixedBackend::failing("model offline"));
        let (state, store, assets) = state(failing);
        let user = UserId::from("u1");

        let result = generate_emoji(&state, &user, &prompt("cat")).await;
        assert!(matches!(result, Err(ApiError::Upstream(_))));
        assert!(store.list_emojis_for(&user).await.is_empty());
        assert!(assets.is_empty().await);
        assert_eq!(store.get_profile(&user).await.unwrap().credits, 3);
    }

    #[tokio::test]
    async fn like_cycle_tracks_count() {
        let (state, _, _) = state(fixed());
        let user = UserId::from("u1");
        let id = generate_emoji(&state, &user, &prompt("cat")).await.unwrap().id;

        let like = |liked| LikeRequest { emoji_id: id, liked };
        assert_eq!(set_like(&state, &user, like(true)).await.unwrap().likes_count, 1);
        assert!(matches!(
            set_like(&state, &user, like(true)).await,
            Err(ApiError::AlreadyLiked(_))
        ));
        assert_eq!(set_like(&state, &user, like(false)).await.unwrap().likes_count, 0);
        assert_eq!(set_like(&state, &user, like(false)).await.unwrap().likes_count, 0);
    }

    #[tokio::test]
    async fn liking_unknown_emoji_is_not_found() {
        let (state, _, _) = state(fixed());
        let request = LikeRequest {
            emoji_id: EmojiId(404),
            liked: true,
        };
        let result = set_like(&state, &UserId::from("u1"), request).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
