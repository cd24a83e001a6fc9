//! Typed request/response contracts for the game and editor servers.
//!
//! Every endpoint may answer `{"error": "..."}` with any HTTP status, so bodies
//! are decoded regardless of status into a [`Reply`] and an `error` field is
//! surfaced as [`ClientError::Application`].

use crate::config::{
    ApiConfig, DELETE_PIECE_PATH, GENERATE_REPLICA_PATH, MAKE_GUESS_PATH, NEW_GAME_PATH,
    REPLACE_COLOR_PATH, SAVE_PLAN_PATH, UPLOAD_PATH,
};
use crate::game::GuessProgress;
use crate::palette::CatalogColor;
use crate::{ClientError, ColorGroup, Piece, PieceId, WorkspacePiece};
use gloo_net::http::{Request, Response};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

/// Either the server's error message or the expected payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Failure { error: String },
    Success(T),
}

impl<T> Reply<T> {
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Reply::Failure { error } => Err(ClientError::Application(error)),
            Reply::Success(value) => Ok(value),
        }
    }
}

/// Catalog colour name → pieces of that colour.
pub type ColorGroups = BTreeMap<String, ColorGroup>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Redirect {
    pub redirect: String,
}

/// Result of analysing an uploaded image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub color_groups: ColorGroups,
    pub image_path: String,
}

/// The server's full piece set after a recolour or delete.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PieceSet {
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub color_groups: ColorGroups,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Replica {
    pub replica_path: String,
}

#[derive(Debug, Serialize)]
struct RecolorRequest {
    piece_id: PieceId,
    new_color: CatalogColor,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    piece_id: PieceId,
}

/// Body of a save-plan request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuttingPlan {
    pub plan: Vec<WorkspacePiece>,
}

/// Decode a response body into the payload or the server's error.
pub fn decode_reply<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let reply: Reply<T> =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;
    reply.into_result()
}

fn network_error(e: gloo_net::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

fn js_error(e: JsValue) -> ClientError {
    ClientError::Network(format!("{:?}", e))
}

fn form_data(fields: &[(&'static str, String)]) -> Result<FormData, ClientError> {
    let form = FormData::new().map_err(js_error)?;
    for (name, value) in fields {
        form.append_with_str(name, value).map_err(js_error)?;
    }
    Ok(form)
}

/// Async client for every endpoint both front-ends consume.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiClient {
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        debug!("{} answered {} ({} bytes)", response.url(), status, body.len());
        let result = decode_reply(&body);
        if let Err(e) = &result {
            warn!("Request to {} failed: {}", response.url(), e);
        }
        result
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = Request::post(&self.config.url(path))
            .json(body)
            .map_err(|e| ClientError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(network_error)?;
        Self::read(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: FormData,
    ) -> Result<T, ClientError> {
        let response = Request::post(&self.config.url(path))
            .body(form)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;
        Self::read(response).await
    }

    /// Start a new game; yields the page the server wants us to continue on.
    pub async fn start_game(&self, fields: &[(&'static str, String)]) -> Result<String, ClientError> {
        let reply: Redirect = self.post_form(NEW_GAME_PATH, form_data(fields)?).await?;
        info!("New game started, server redirect: {}", reply.redirect);
        Ok(reply.redirect)
    }

    pub async fn submit_guess(
        &self,
        fields: &[(&'static str, String)],
    ) -> Result<GuessProgress, ClientError> {
        self.post_form(MAKE_GUESS_PATH, form_data(fields)?).await
    }

    pub async fn upload_image(&self, file: &File) -> Result<Analysis, ClientError> {
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename("image", file, &file.name())
            .map_err(js_error)?;
        info!("Uploading '{}' ({} bytes) for analysis", file.name(), file.size());
        let analysis: Analysis = self.post_form(UPLOAD_PATH, form).await?;
        info!(
            "Analysis finished: {} pieces in {} colours",
            analysis.pieces.len(),
            analysis.color_groups.len()
        );
        Ok(analysis)
    }

    pub async fn replace_color(
        &self,
        piece_id: PieceId,
        new_color: CatalogColor,
    ) -> Result<PieceSet, ClientError> {
        info!("Recolouring piece {} to {}", piece_id, new_color);
        self.post_json(REPLACE_COLOR_PATH, &RecolorRequest { piece_id, new_color })
            .await
    }

    pub async fn delete_piece(&self, piece_id: PieceId) -> Result<PieceSet, ClientError> {
        info!("Deleting piece {}", piece_id);
        self.post_json(DELETE_PIECE_PATH, &DeleteRequest { piece_id })
            .await
    }

    pub async fn save_plan(&self, plan: &CuttingPlan) -> Result<String, ClientError> {
        info!("Saving cutting plan with {} pieces", plan.plan.len());
        let notice: Notice = self.post_json(SAVE_PLAN_PATH, plan).await?;
        Ok(notice.message)
    }

    pub async fn generate_replica(&self) -> Result<String, ClientError> {
        let response = Request::post(&self.config.url(GENERATE_REPLICA_PATH))
            .send()
            .await
            .map_err(network_error)?;
        let replica: Replica = Self::read(response).await?;
        Ok(replica.replica_path)
    }
}
