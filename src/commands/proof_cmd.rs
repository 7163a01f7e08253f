//! Chore proofs: photo upload, proof record, leaderboard point

use chrono::Utc;
use serde_json::json;

use super::to_row;
use crate::app::App;
use crate::domain::normalize::RawLeaderboardRecord;
use crate::domain::{DomainError, DomainResult, NewLeaderboardEntry, NewProof, ProofRecord};
use crate::repository::{random_suffix, EntityKind, PhotoUpload, RowKey};

/// Upload `photo`, record the proof and give `user_name` a point.
///
/// Upload and proof insert failures abort the submission. A failed score
/// update is logged and the local score is bumped anyway.
pub async fn submit_proof(app: &App, user_name: &str, task: &str, photo: PhotoUpload) -> DomainResult<ProofRecord> {
    // Validate before uploading anything
    NewProof::new(user_name, task, String::new())?;

    let suffix = random_suffix(&mut rand::thread_rng());
    let path = photo.storage_path(Utc::now().timestamp_millis(), &suffix);
    let content_type = photo.content_type();

    let stored = app
        .gateway
        .upload_blob(&app.bucket, &path, photo.bytes, &content_type)
        .await
        .map_err(|e| {
            log::error!("Failed to upload photo {}: {}", path, e);
            e
        })?;
    let photo_url = app.gateway.public_url(&app.bucket, &stored);

    let proof = record_proof(app, NewProof::new(user_name, task, photo_url)?).await?;
    award_point(app, &proof.user_name).await;

    app.state.lock().await.prepend_proof(proof.clone());
    Ok(proof)
}

async fn record_proof(app: &App, draft: NewProof) -> DomainResult<ProofRecord> {
    let created = match app.gateway.insert(EntityKind::Proofs, to_row(&draft)?).await {
        Ok(row) => row,
        Err(e) => {
            log::error!("Failed to record proof for {}: {}", draft.user_name, e);
            return Err(e);
        }
    };
    let proof: ProofRecord = serde_json::from_value(created)?;
    log::info!("Recorded proof {} for {}", proof.id, proof.user_name);
    Ok(proof)
}

/// Increment the member's score by one, inserting the member if missing
async fn award_point(app: &App, name: &str) {
    let next_score = {
        let state = app.state.lock().await;
        state.find_member(name).map(|m| m.score + 1).unwrap_or(1)
    };

    let updated = app
        .gateway
        .update(EntityKind::Leaderboard, RowKey::Name(name.to_string()), json!({ "score": next_score }))
        .await;

    match updated {
        Ok(Some(row)) => match RawLeaderboardRecord::from_value(&row).normalize() {
            Some(entry) => app.state.lock().await.upsert_member(entry),
            None => {
                app.state.lock().await.set_member_score(name, next_score);
            }
        },
        Ok(None) => {
            log::info!("{} not on the leaderboard yet, adding", name);
            if let Err(e) = insert_member(app, name, next_score).await {
                log::error!("Failed to add {} to the leaderboard: {}", name, e);
            }
        }
        Err(e) => {
            log::error!("Failed to update score for {}: {}", name, e);
            app.state.lock().await.set_member_score(name, next_score);
        }
    }
}

async fn insert_member(app: &App, name: &str, score: i64) -> DomainResult<()> {
    let created = app
        .gateway
        .insert(EntityKind::Leaderboard, to_row(&NewLeaderboardEntry::new(name, score))?)
        .await?;
    let entry = RawLeaderboardRecord::from_value(&created)
        .normalize()
        .ok_or_else(|| DomainError::Backend(format!("created member has no id: {}", created)))?;
    app.state.lock().await.upsert_member(entry);
    Ok(())
}
