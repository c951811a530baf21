use axum::{extract::State, http::StatusCode, Json};
use futures_util::{stream, StreamExt};

use crate::models::nft::{ChainTokenEntry, ErrorResponse};
use crate::AppState;

/// Concurrent gateway fetches while enriching enumerated tokens
const MAX_CONCURRENT_METADATA_FETCHES: usize = 4;

// GET /api/nft/chain/tokens - enumerate the collection on-chain and
// enrich each token URI with its metadata document. O(supply) RPC
// round trips; latency grows with collection size.
pub async fn list_chain_tokens(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChainTokenEntry>>, (StatusCode, Json<ErrorResponse>)> {
    let uris = state.chain.list_token_uris().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Chain enumeration failed: {}", e),
            }),
        )
    })?;

    let entries = stream::iter(uris)
        .map(|token_uri| {
            let state = state.clone();
            async move {
                // Metadata fetch is best-effort; an unreachable
                // gateway still returns the URI
                let metadata = match cid_from_uri(&token_uri) {
                    Some(cid) => state.pinning.fetch_metadata(cid).await.ok(),
                    None => None,
                };
                ChainTokenEntry {
                    token_uri,
                    metadata,
                }
            }
        })
        .buffered(MAX_CONCURRENT_METADATA_FETCHES)
        .collect::<Vec<_>>()
        .await;

    Ok(Json(entries))
}

/// Pull the CID out of a gateway URL of the form
/// `https://<host>/ipfs/<cid>`
fn cid_from_uri(uri: &str) -> Option<&str> {
    let (_, rest) = uri.split_once("/ipfs/")?;
    let cid = rest.split('/').next().unwrap_or(rest);
    if cid.is_empty() {
        None
    } else {
        Some(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_cid_from_gateway_url() {
        assert_eq!(
            cid_from_uri("https://gateway.pinata.cloud/ipfs/QmAbc123"),
            Some("QmAbc123")
        );
    }

    #[test]
    fn rejects_non_gateway_uris() {
        assert_eq!(cid_from_uri("https://example.com/foo"), None);
        assert_eq!(cid_from_uri("https://gateway.pinata.cloud/ipfs/"), None);
    }
}
