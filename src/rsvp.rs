//! The RSVP core: search, the one-shot submission guard, guest reconciliation,
//! and the best-effort audit append.
//!
//! Order matters in [`submit_rsvp`]. The conditional party write goes first and
//! decides the whole request: once it returns 0 the request is over, and once it
//! returns 1 no concurrent submission for the same party can get past it again.
//! Guest updates are validated against the authoritative owned set before any of
//! them is applied; the audit append comes last and is the only step whose
//! failure is swallowed.
use std::collections::HashSet;

use chrono::Utc;
use tracing::warn;

use crate::{
    error::AppError,
    models::{AuditRecord, ContactUpdate, GuestUpdate, PartyView, Submission},
    store::GuestDirectory,
    utils::normalize_token,
};

/// Resolves a free-text name to the party it belongs to, with its guests.
/// Read-only.
pub async fn search_party(
    directory: &dyn GuestDirectory,
    name: &str,
) -> Result<PartyView, AppError> {
    let token = normalize_token(name);
    if token.is_empty() {
        return Err(AppError::MalformedPayload);
    }

    let party = directory
        .find_party_by_token(&token)
        .await?
        .ok_or(AppError::NotFound("invitation"))?;
    let guests = directory.guests_for_party(&party.id).await?;

    Ok(PartyView::from_parts(party, guests))
}

/// Accepts a party's single RSVP. Returns the number of guest rows updated.
///
/// Exactly one of N concurrent calls for the same party succeeds; the rest get
/// [`AppError::AlreadySubmitted`]. Which one wins is whichever conditional write
/// lands first at the store.
pub async fn submit_rsvp(
    directory: &dyn GuestDirectory,
    submission: &Submission,
) -> Result<usize, AppError> {
    if submission.party_id.is_empty() {
        return Err(AppError::MalformedPayload);
    }

    let contact = ContactUpdate {
        email: submission.email.clone(),
        phone: submission.phone.clone(),
        admin_notes: submission
            .message
            .as_ref()
            .map(|m| format!("User Message: {m}")),
    };

    let updated = directory
        .conditional_update_party(&submission.party_id, &contact)
        .await?;
    if updated == 0 {
        // The gate did not fire: either the party already responded or it does
        // not exist. The probe runs after the fact, which is safe because
        // has_responded never goes back to false and parties are not deleted.
        return Err(if directory.party_exists(&submission.party_id).await? {
            AppError::AlreadySubmitted
        } else {
            AppError::NotFound("invitation")
        });
    }

    if !submission.guests.is_empty() {
        reconcile_guests(directory, &submission.party_id, &submission.guests).await?;
    }

    let record = AuditRecord {
        party_id: submission.party_id.clone(),
        action: "RSVP_SUBMITTED",
        email: submission.email.clone(),
        phone: submission.phone.clone(),
        message: submission.message.clone(),
        guests_updated: submission.guests.len(),
        recorded_at: Utc::now(),
    };
    if let Err(err) = directory.append_audit_log(&record).await {
        // The RSVP is already durably accepted; the audit trail is diagnostic.
        warn!("Failed to append audit log for party {}: {err}", record.party_id);
    }

    Ok(submission.guests.len())
}

/// Validates ownership of the whole batch before applying any of it. A single
/// foreign, unknown, or duplicated guest id rejects the entire submission.
async fn reconcile_guests(
    directory: &dyn GuestDirectory,
    party_id: &str,
    updates: &[GuestUpdate],
) -> Result<(), AppError> {
    let owned: HashSet<String> = directory
        .guests_for_party(party_id)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();

    let submitted: HashSet<&str> = updates.iter().map(|u| u.id.as_str()).collect();
    let matched = submitted.iter().filter(|id| owned.contains(**id)).count();
    if matched != updates.len() {
        return Err(AppError::InvalidGuestData);
    }

    directory
        .batch_update_guests(party_id, updates)
        .await
        .map_err(AppError::from)
}
