//! Transcription API methods

use super::ApiClient;
use super::error::ClientError;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use scribe_core::types::{
    Transcription, TranscriptionData, TranscriptionListData, TranscriptionSource,
};

impl ApiClient {
    /// List the account's transcriptions, newest first
    pub async fn list_transcriptions(&self) -> Result<Vec<Transcription>, ClientError> {
        let envelope = self
            .request(Method::GET, "/transcriptions", None, &[])
            .await?
            .require_success()?;
        let data: Option<TranscriptionListData> = envelope.data_as()?;
        Ok(data.map(|data| data.transcriptions).unwrap_or_default())
    }

    /// Upload audio for transcription and return the stored record
    ///
    /// The audio is taken by value so the multipart form can be rebuilt
    /// for the retry after a token refresh.
    pub async fn create_transcription(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        source: TranscriptionSource,
    ) -> Result<Transcription, ClientError> {
        let envelope = self
            .send(|| {
                let part = Part::bytes(audio.clone()).file_name(file_name.to_string());
                let form = Form::new()
                    .part("audio", part)
                    .text("source", source.as_str());
                self.client
                    .post(format!("{}/transcriptions", self.base_url))
                    .multipart(form)
            })
            .await?
            .require_success()?;
        let data: TranscriptionData = envelope.data_as()?;
        Ok(data.transcription)
    }

    /// Delete a transcription by id
    pub async fn delete_transcription(&self, id: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, &format!("/transcriptions/{id}"), None, &[])
            .await?
            .require_success()?;
        Ok(())
    }
}
