use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::models::nft::{
    ErrorResponse, MintFailureResponse, MintRequestBody, MintSuccessResponse, NftDetailResponse,
    NftResponse, ValidateAddressRequest, ValidateAddressResponse,
};
use crate::services::address::is_valid_address;
use crate::services::minting::{ImageSource, MintError, MintRequest};
use crate::AppState;

/// Header set by the auth layer in front of this service
const USER_ID_HEADER: &str = "x-user-id";

fn uploader_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

// POST /api/nft/upload - multipart image + fields, full mint flow
pub async fn upload_nft(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MintSuccessResponse>), Response> {
    let mut image: Option<Vec<u8>> = None;
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut owner_address: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read image: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    bad_request(format!("Failed to read name field: {}", e))
                })?);
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| {
                    bad_request(format!("Failed to read description field: {}", e))
                })?);
            }
            Some("ownerAddress") => {
                owner_address = Some(field.text().await.map_err(|e| {
                    bad_request(format!("Failed to read ownerAddress field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| bad_request("Missing image file".to_string()))?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| bad_request("Missing name field".to_string()))?;
    let owner_address =
        owner_address.ok_or_else(|| bad_request("Missing ownerAddress field".to_string()))?;

    let request = MintRequest {
        name,
        description: description.filter(|d| !d.is_empty()),
        image: ImageSource::Bytes(image),
        owner_address,
        uploader_id: uploader_id(&headers),
        attributes: None,
    };

    run_mint(&state, request).await
}

// POST /api/nft/mint - mint against an already-pinned image CID
pub async fn mint_nft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MintRequestBody>,
) -> Result<(StatusCode, Json<MintSuccessResponse>), Response> {
    if body.name.trim().is_empty() {
        return Err(bad_request("Missing name field".to_string()));
    }

    let request = MintRequest {
        name: body.name,
        description: body.description.filter(|d| !d.is_empty()),
        image: ImageSource::PinnedCid(body.ipfs_hash),
        owner_address: body.owner_address,
        uploader_id: uploader_id(&headers),
        attributes: body.attributes,
    };

    run_mint(&state, request).await
}

async fn run_mint(
    state: &AppState,
    request: MintRequest,
) -> Result<(StatusCode, Json<MintSuccessResponse>), Response> {
    match state.orchestrator.mint_nft(request).await {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(MintSuccessResponse {
                success: true,
                nft: NftResponse::from_model(record, state.pinning.as_ref()),
            }),
        )),
        Err(e) => Err(mint_error_response(state, e)),
    }
}

fn mint_error_response(state: &AppState, error: MintError) -> Response {
    match error {
        MintError::InvalidAddress(address) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid owner address: {}", address),
            }),
        )
            .into_response(),
        MintError::Pinning(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("IPFS pinning failed: {}", e),
            }),
        )
            .into_response(),
        MintError::Chain { record, source } => {
            // Pinning succeeded; hand the CIDs back so a retry can
            // reuse them instead of re-uploading
            let ipfs_hash = record.ipfs_hash.clone();
            let metadata_hash = record.metadata_hash.clone();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MintFailureResponse {
                    success: false,
                    error: format!("Minting failed: {}", source),
                    ipfs_hash,
                    metadata_hash,
                    nft: NftResponse::from_model(record, state.pinning.as_ref()),
                }),
            )
                .into_response()
        }
        MintError::Store(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
            .into_response(),
    }
}

// GET /api/nft/list
pub async fn list_nfts(
    State(state): State<AppState>,
) -> Result<Json<Vec<NftResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let records = state.store.list_all().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| NftResponse::from_model(r, state.pinning.as_ref()))
            .collect(),
    ))
}

// GET /api/nft/my-nfts - records owned by the authenticated uploader
pub async fn my_nfts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NftResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = uploader_id(&headers).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Authentication required".to_string(),
            }),
        )
    })?;

    let records = state.store.find_by_uploader(&user_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| NftResponse::from_model(r, state.pinning.as_ref()))
            .collect(),
    ))
}

// GET /api/nft/by-wallet/{address}
pub async fn by_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<NftResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if !is_valid_address(&address) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid wallet address: {}", address),
            }),
        ));
    }

    let records = state.store.find_by_owner(&address).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| NftResponse::from_model(r, state.pinning.as_ref()))
            .collect(),
    ))
}

// GET /api/nft/{id} - stored record plus best-effort live chain state
pub async fn get_nft(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NftDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let record = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Database error: {}", e),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("NFT {} not found", id),
                }),
            )
        })?;

    // Live read only makes sense for minted tokens; a chain read
    // failure degrades to the stored record
    let mut current_owner = None;
    let mut token_uri = None;
    if let Some(token_id) = record.token_id {
        match state.chain.nft_data(token_id as u64).await {
            Ok(data) => {
                current_owner = Some(data.owner);
                token_uri = Some(data.token_uri);
            }
            Err(e) => {
                tracing::warn!(id = id, token_id = token_id, error = %e, "Live chain read failed");
            }
        }
    }

    Ok(Json(NftDetailResponse {
        nft: NftResponse::from_model(record, state.pinning.as_ref()),
        current_owner,
        token_uri,
    }))
}

// POST /api/nft/validate-address
pub async fn validate_address(
    Json(body): Json<ValidateAddressRequest>,
) -> Json<ValidateAddressResponse> {
    let is_valid = is_valid_address(&body.address);
    Json(ValidateAddressResponse {
        address: body.address,
        is_valid,
    })
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}
