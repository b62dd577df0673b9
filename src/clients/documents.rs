use std::{collections::HashMap, path::Path, time::Instant};

use reqwest::{
    Method, StatusCode,
    header::{CONTENT_TYPE, LOCATION},
};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::info;

use crate::clients::base::{GiniClient, api_error, expect_status, read_json};
use crate::error::{ApiErrorKind, Error, Result};
use crate::models::{
    Document, DocumentSet, Extraction, Extractions, Layout, ListOptions, SearchOptions,
    UploadOptions,
};
use crate::poller::{self, PollError, PollOptions};
use crate::utils::get_content_type;

const INCUBATOR_ACCEPT: &str = "application/vnd.gini.incubator+json";
const OCTET_STREAM: &str = "application/octet-stream";

impl GiniClient {
    /// Upload a document and wait until its processing has finished.
    ///
    /// The returned document is in a terminal state: check its `progress`
    /// to see whether processing completed or failed. Upload and processing
    /// times are recorded in its `timing`.
    pub async fn upload(&self, document: Vec<u8>, options: &UploadOptions) -> Result<Document> {
        let started = Instant::now();
        let url = format!("{}/documents", self.endpoints().api);

        let mut query = Vec::new();
        if let Some(file_name) = &options.file_name {
            query.push(("filename", file_name.as_str()));
        }
        if let Some(doc_type) = &options.doc_type {
            query.push(("doctype", doc_type.as_str()));
        }
        let content_type = options.content_type.as_deref().unwrap_or(OCTET_STREAM);

        let builder = self
            .request(Method::POST, &url, &options.user_identifier)?
            .query(&query)
            .header(CONTENT_TYPE, content_type)
            .body(document);
        let response = self.send(builder).await?;
        expect_status(&response, StatusCode::CREATED, ApiErrorKind::UploadFailed, None)?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::MissingHeader("Location"))?
            .to_string();
        let upload_time = started.elapsed();

        info!(
            file_name = options.file_name.as_deref().unwrap_or(""),
            location = location.as_str(),
            "Document upload accepted"
        );

        let mut document = self.get(&location, &options.user_identifier).await?;
        if document.links.document.is_empty() {
            document.links.document = location;
        }
        let mut document = self.wait_for_processing(&document, &options.poll).await?;
        document.timing.upload = upload_time;
        Ok(document)
    }

    /// Read a local file and [`upload`](GiniClient::upload) it.
    ///
    /// Content type and file name are derived from the path unless set in
    /// `options`.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<Document> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let mut file = File::open(path).await.map_err(|source| Error::Io {
            path: display.clone(),
            source,
        })?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .await
            .map_err(|source| Error::Io {
                path: display.clone(),
                source,
            })?;

        let mut options = options.clone();
        if options.content_type.is_none() {
            options.content_type = Some(get_content_type(&display).to_string());
        }
        if options.file_name.is_none() {
            options.file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string);
        }

        self.upload(contents, &options).await
    }

    /// Poll a document's self link until processing completes or fails.
    pub async fn wait_for_processing(
        &self,
        document: &Document,
        options: &PollOptions,
    ) -> Result<Document> {
        let started = Instant::now();
        let client = self.clone();
        let owner = document.owner.clone();
        let fetch = move |url: String| {
            let client = client.clone();
            let owner = owner.clone();
            async move { client.get(&url, &owner).await }
        };

        let mut polled = match poller::poll(&document.links.document, fetch, options).await {
            Ok(polled) => polled,
            Err(PollError::TimeoutExceeded(timeout)) => return Err(Error::PollTimeout(timeout)),
            Err(PollError::FetchFailed(e)) => return Err(e),
        };
        polled.timing.processing = started.elapsed();

        info!(
            document_id = polled.id.as_str(),
            progress = polled.progress.as_str(),
            processing_ms = polled.timing.processing.as_millis() as u64,
            "Document processing finished"
        );
        Ok(polled)
    }

    /// Fetch a document from its URL.
    pub async fn get(&self, url: &str, user_identifier: &str) -> Result<Document> {
        let builder = self.request(Method::GET, url, user_identifier)?;
        let response = self.send(builder).await?;
        expect_status(&response, StatusCode::OK, ApiErrorKind::DocumentGet, None)?;

        let mut document: Document = read_json(response).await?;
        document.owner = user_identifier.to_string();
        Ok(document)
    }

    /// Re-fetch `document` from its self link.
    pub async fn refresh(&self, document: &mut Document) -> Result<()> {
        let fresh = self.get(&document.links.document, &document.owner).await?;
        *document = fresh;
        Ok(())
    }

    pub async fn list(&self, options: &ListOptions) -> Result<DocumentSet> {
        let url = format!("{}/documents", self.endpoints().api);
        let builder = self
            .request(Method::GET, &url, &options.user_identifier)?
            .query(&[("limit", options.limit), ("offset", options.offset)]);
        let response = self.send(builder).await?;
        expect_status(&response, StatusCode::OK, ApiErrorKind::DocumentList, None)?;

        let mut set: DocumentSet = read_json(response).await?;
        for document in &mut set.documents {
            document.owner = options.user_identifier.clone();
        }
        Ok(set)
    }

    pub async fn search(&self, options: &SearchOptions) -> Result<DocumentSet> {
        let url = format!("{}/search", self.endpoints().api);
        let mut query = vec![
            ("q", options.query.clone()),
            ("limit", options.limit.to_string()),
            ("next", options.offset.to_string()),
        ];
        if let Some(doc_type) = &options.doc_type {
            query.push(("type", doc_type.clone()));
        }

        let builder = self
            .request(Method::GET, &url, &options.user_identifier)?
            .query(&query);
        let response = self.send(builder).await?;
        expect_status(&response, StatusCode::OK, ApiErrorKind::DocumentSearch, None)?;

        let mut set: DocumentSet = read_json(response).await?;
        for document in &mut set.documents {
            document.owner = options.user_identifier.clone();
        }
        Ok(set)
    }

    pub async fn delete(&self, document: &Document) -> Result<()> {
        let builder = self.request(Method::DELETE, &document.links.document, &document.owner)?;
        let response = self.send(builder).await?;
        expect_status(
            &response,
            StatusCode::NO_CONTENT,
            ApiErrorKind::DocumentDelete,
            Some(&document.id),
        )?;

        info!(document_id = document.id.as_str(), "Document deleted");
        Ok(())
    }

    /// File an error report for a document that was processed badly.
    pub async fn error_report(
        &self,
        document: &Document,
        summary: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/errorreport", document.links.document);
        let builder = self
            .request(Method::POST, &url, &document.owner)?
            .query(&[("summary", summary), ("description", description)]);
        let response = self.send(builder).await?;
        expect_status(
            &response,
            StatusCode::OK,
            ApiErrorKind::DocumentReport,
            Some(&document.id),
        )?;
        Ok(())
    }

    pub async fn layout(&self, document: &Document) -> Result<Layout> {
        let builder = self.request(Method::GET, &document.links.layout, &document.owner)?;
        let response = self.send(builder).await?;
        expect_status(
            &response,
            StatusCode::OK,
            ApiErrorKind::DocumentLayout,
            Some(&document.id),
        )?;
        read_json(response).await
    }

    /// Fetch a document's extractions, from the incubator when `incubator` is set.
    pub async fn extractions(&self, document: &Document, incubator: bool) -> Result<Extractions> {
        let url = &document.links.extractions;
        let builder = if incubator {
            self.request_accepting(Method::GET, url, INCUBATOR_ACCEPT, &document.owner)?
        } else {
            self.request(Method::GET, url, &document.owner)?
        };
        let response = self.send(builder).await?;
        expect_status(
            &response,
            StatusCode::OK,
            ApiErrorKind::DocumentExtractions,
            Some(&document.id),
        )?;
        read_json(response).await
    }

    /// Download the processed (rectified, optimized) document.
    pub async fn processed(&self, document: &Document) -> Result<Vec<u8>> {
        let builder = self.request_accepting(
            Method::GET,
            &document.links.processed,
            OCTET_STREAM,
            &document.owner,
        )?;
        let response = self.send(builder).await?;
        if response.status() != StatusCode::OK {
            return Err(api_error(
                &response,
                ApiErrorKind::DocumentProcessed,
                Some(&document.id),
            ));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Send corrected extractions back to the API.
    pub async fn submit_feedback(
        &self,
        document: &Document,
        feedback: &HashMap<String, Extraction>,
    ) -> Result<()> {
        let builder = self
            .request(Method::PUT, &document.links.extractions, &document.owner)?
            .json(&serde_json::json!({ "feedback": feedback }));
        let response = self.send(builder).await?;
        expect_status(
            &response,
            StatusCode::NO_CONTENT,
            ApiErrorKind::DocumentFeedback,
            Some(&document.id),
        )?;
        Ok(())
    }
}
