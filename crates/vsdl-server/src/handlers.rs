//! Axum handlers for the advisory HTTP surface (spec §6.3): Issue, Dispense,
//! Verify, and two read-only diagnostics endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use zeroize::Zeroize;

use vsdl_core::{
    commit_record, recompute_from_openings, subset_commitment, verify_partition, OpeningWire, PartitionProof, Point,
};
use vsdl_core::token::{self, Claims};

use crate::error::ApiError;
use crate::state::{now_unix, IssuedState, ServerState};

pub type AppState = Arc<RwLock<ServerState>>;

fn random_token_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn subject_fingerprint(record_id: &str) -> String {
    let digest = Sha256::digest(record_id.as_bytes());
    hex::encode(digest)[..16].to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub record_id: String,
    pub policy_id: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCryptography {
    pub record_commitment: String,
    pub policy_hash: String,
    pub field_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub token_id: String,
    pub token: String,
    pub url: String,
    pub expires_at: u64,
    pub cryptography: IssueCryptography,
}

/// `POST /token/create` — spec §4.4 `issue_token`.
pub async fn issue(State(state): State<AppState>, Json(req): Json<IssueRequest>) -> Result<Json<IssueResponse>, ApiError> {
    let mut state = state.write().await;
    let now = now_unix();
    state.sweep_expired(now);

    let record = state
        .records
        .get(&req.record_id)
        .ok_or_else(|| ApiError::from(vsdl_core::Error::RecordNotFound(req.record_id.clone())))?
        .clone();
    let policy = state
        .policies
        .get(&req.policy_id)
        .ok_or_else(|| ApiError::from(vsdl_core::Error::InvalidPolicy(req.policy_id.clone())))?
        .clone();

    policy.check_covers(&record)?;

    let mut rng = rand::rngs::OsRng;
    let rc = commit_record(&record, &mut rng);
    let policy_hash = vsdl_core::policy_hash(&policy);
    let token_id = random_token_id();
    let expiry = now + req.expires_in;

    let claims = Claims {
        jti: token_id.clone(),
        sub: subject_fingerprint(&req.record_id),
        policy: policy.id.clone(),
        policy_hash: policy_hash.clone(),
        commitment: hex::encode(rc.c_d.encode()),
        actions: policy.actions.clone(),
        exp: expiry,
        iss: "vsdl-gov-portal".to_string(),
    };
    let token = token::issue(&claims, &state.secret)?;

    let cryptography = IssueCryptography {
        record_commitment: hex::encode(rc.c_d.encode()),
        policy_hash,
        field_count: rc.fields.len(),
    };

    state.tokens.insert(
        token_id.clone(),
        IssuedState { policy, field_commitments: rc.fields, c_d: rc.c_d, created_at: now, expiry },
    );

    Ok(Json(IssueResponse {
        token_id: token_id.clone(),
        url: format!("/delegate/{token}"),
        token,
        expires_at: expiry,
        cryptography,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseResponse {
    pub filtered_record: HashMap<String, String>,
    pub actions: Vec<String>,
    pub proof: PartitionProof,
}

/// `GET /delegate/:token` — spec §4.5 `Dispense`.
pub async fn dispense(State(state): State<AppState>, Path(token): Path<String>) -> Result<Json<DispenseResponse>, ApiError> {
    let mut state = state.write().await;
    let now = now_unix();

    let claims = token::verify(&token, &state.secret, now)?;

    let issued = state.tokens.get_mut(&claims.jti).ok_or(vsdl_core::Error::TokenNotFound)?;
    if issued.policy.id != claims.policy {
        // the claims segment was substituted for a different policy without
        // re-signing; HMAC verification above would already have caught
        // this, but treat a stored/claims mismatch as the same failure.
        return Err(ApiError::from(vsdl_core::Error::InvalidToken));
    }

    let record_names: std::collections::HashSet<String> = issued.field_commitments.keys().cloned().collect();
    let visible: std::collections::HashSet<String> =
        issued.policy.visible.iter().filter(|n| record_names.contains(*n)).cloned().collect();
    let hidden: std::collections::HashSet<String> =
        issued.policy.hidden.iter().filter(|n| record_names.contains(*n)).cloned().collect();

    let c_h = subset_commitment(&issued.field_commitments, &hidden);

    let mut filtered_record = HashMap::with_capacity(visible.len());
    let mut openings = Vec::with_capacity(visible.len());
    for name in &visible {
        let fc = &issued.field_commitments[name];
        filtered_record.insert(fc.name.clone(), fc.value.clone());
        openings.push(OpeningWire::from_opening(&vsdl_core::Opening { name: fc.name.clone(), value: fc.value.clone(), r: fc.r }));
    }

    // hidden-field randomness never leaves the process; zero it in place
    // once Dispense no longer needs it (spec §5).
    for name in &hidden {
        if let Some(fc) = issued.field_commitments.get_mut(name) {
            fc.r.zeroize();
        }
    }

    let proof = PartitionProof {
        record_commitment: hex::encode(issued.c_d.encode()),
        hidden_commitment: hex::encode(c_h.encode()),
        openings,
        hidden_field_count: hidden.len(),
    };

    Ok(Json(DispenseResponse { filtered_record, actions: issued.policy.actions.clone(), proof }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub record_commitment: String,
    pub hidden_commitment: String,
    pub visible_fields: Vec<OpeningWire>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub recomputed_visible: String,
    pub verification: String,
}

/// `POST /verify` — a standalone convenience check (spec §4.5 `Verify`)
/// distinct from [`PartitionProof::verify`]: the caller supplies the
/// commitments directly rather than via a token, so there is no
/// token-bound value to cross-check against.
pub async fn verify(Json(req): Json<VerifyRequest>) -> Result<Json<VerifyResponse>, ApiError> {
    let c_d = Point::decode(&hex::decode(&req.record_commitment).map_err(|_| vsdl_core::Error::Malformed)?)?;
    let c_h = Point::decode(&hex::decode(&req.hidden_commitment).map_err(|_| vsdl_core::Error::Malformed)?)?;

    let openings: vsdl_core::Result<Vec<vsdl_core::Opening>> = req
        .visible_fields
        .iter()
        .map(|w| {
            let bytes = hex::decode(&w.r).map_err(|_| vsdl_core::Error::Malformed)?;
            let r = vsdl_core::group::Scalar::decode(&bytes)?;
            Ok(vsdl_core::Opening { name: w.name.clone(), value: w.value.clone(), r })
        })
        .collect();
    let openings = openings?;
    let c_f = recompute_from_openings(&openings);

    let valid = verify_partition(&c_d, &c_h, &c_f);
    let verification = if valid { "partition holds" } else { "partition mismatch" };

    Ok(Json(VerifyResponse { valid, recomputed_visible: hex::encode(c_f.encode()), verification: verification.to_string() }))
}

#[derive(Serialize)]
pub struct GeneratorsResponse {
    pub g: String,
    pub h: String,
    pub curve: String,
}

/// `GET /generators` — diagnostics.
pub async fn generators() -> Json<GeneratorsResponse> {
    Json(GeneratorsResponse {
        g: hex::encode(Point::generator_g().encode()),
        h: hex::encode(Point::generator_h().encode()),
        curve: "ristretto255".to_string(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub id: String,
    pub visible: Vec<String>,
    pub hidden: Vec<String>,
    pub actions: Vec<String>,
}

#[derive(Serialize)]
pub struct PoliciesResponse {
    pub policies: Vec<PolicySummary>,
}

/// `GET /policies` — catalog listing.
pub async fn policies(State(state): State<AppState>) -> Json<PoliciesResponse> {
    let state = state.read().await;
    let mut policies: Vec<PolicySummary> = state
        .policies
        .values()
        .map(|p| {
            let mut visible: Vec<String> = p.visible.iter().cloned().collect();
            let mut hidden: Vec<String> = p.hidden.iter().cloned().collect();
            visible.sort();
            hidden.sort();
            PolicySummary { id: p.id.clone(), visible, hidden, actions: p.actions.clone() }
        })
        .collect();
    policies.sort_by(|a, b| a.id.cmp(&b.id));
    Json(PoliciesResponse { policies })
}
