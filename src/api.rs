use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::{NewNote, Note};

const NOTES_PATH: &str = "notes-list";

/// Why a request to the notes service failed.
///
/// The view treats all of these the same way; the cause is only logged.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request failed with status {0}")]
    Status(StatusCode),

    #[error("could not decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn get_all_notes(&self) -> ApiResult<Vec<Note>>;

    /// The response body is ignored; callers re-fetch the list.
    async fn add_note(&self, note: &NewNote) -> ApiResult<()>;
}

pub struct HttpNotesApi {
    client: Client,
    endpoint: String,
}

impl HttpNotesApi {
    pub fn new(base_url: &str) -> HttpNotesApi {
        HttpNotesApi {
            client: Client::new(),
            endpoint: format!("{}/{NOTES_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn get_all_notes(&self) -> ApiResult<Vec<Note>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        response.json::<Vec<Note>>().await.map_err(ApiError::Decode)
    }

    async fn add_note(&self, note: &NewNote) -> ApiResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(note)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        Ok(())
    }
}
