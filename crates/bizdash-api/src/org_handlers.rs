use axum::{
    extract::{Extension, Path, State},
    Json,
};
use bizdash_core::Session;
use bizdash_identity::{OrgMember, OrgRole, Organization};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::handlers::MessageResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OrgRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct OrgResponse {
    pub success: bool,
    pub organization: Organization,
}

#[derive(Serialize)]
pub struct MembersResponse {
    pub success: bool,
    pub members: Vec<OrgMember>,
}

#[derive(Serialize)]
pub struct MemberResponse {
    pub success: bool,
    pub member: OrgMember,
}

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: OrgRole,
}

#[derive(Deserialize)]
pub struct UpdateMemberRequest {
    pub role: OrgRole,
}

pub async fn create_organization(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<OrgRequest>,
) -> ApiResult<Json<OrgResponse>> {
    let organization = state.orgs.create(&request.name, &session.user_id).await?;
    Ok(Json(OrgResponse {
        success: true,
        organization,
    }))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Extension(_session): Extension<Session>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<OrgResponse>> {
    let organization = state.orgs.get(&org_id).await?;
    Ok(Json(OrgResponse {
        success: true,
        organization,
    }))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(org_id): Path<String>,
    Json(request): Json<OrgRequest>,
) -> ApiResult<Json<OrgResponse>> {
    state.orgs.require_admin(&org_id, &session.user_id).await?;
    let organization = state.orgs.rename(&org_id, &request.name).await?;
    Ok(Json(OrgResponse {
        success: true,
        organization,
    }))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.orgs.require_admin(&org_id, &session.user_id).await?;
    state.orgs.delete(&org_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("organization {org_id} deleted"),
    }))
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(_session): Extension<Session>,
    Path(org_id): Path<String>,
) -> ApiResult<Json<MembersResponse>> {
    let members = state.orgs.members(&org_id).await?;
    Ok(Json(MembersResponse {
        success: true,
        members,
    }))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(org_id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    state.orgs.require_admin(&org_id, &session.user_id).await?;
    let member = state
        .orgs
        .add_member(&org_id, &request.user_id, request.role)
        .await?;
    Ok(Json(MemberResponse {
        success: true,
        member,
    }))
}

/// Role changes run through the last-admin guard: demoting the only admin
/// is a 400, not a write.
pub async fn update_member(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((org_id, member_id)): Path<(String, String)>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    state.orgs.require_admin(&org_id, &session.user_id).await?;
    let member = state
        .orgs
        .update_member_role(&org_id, &member_id, request.role)
        .await?;
    Ok(Json(MemberResponse {
        success: true,
        member,
    }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((org_id, member_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    state.orgs.require_admin(&org_id, &session.user_id).await?;
    state.orgs.remove_member(&org_id, &member_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("member {member_id} removed from {org_id}"),
    }))
}
