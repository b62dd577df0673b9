use crate::poller::PollOptions;

/// Parameters for [`GiniClient::upload`](crate::GiniClient::upload).
///
/// `user_identifier` is required when the client authenticates with
/// Basic auth. Everything else is optional.
#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    pub poll: PollOptions,
    pub file_name: Option<String>,
    pub doc_type: Option<String>,
    pub content_type: Option<String>,
    pub user_identifier: String,
}

impl UploadOptions {
    pub fn new(user_identifier: impl Into<String>) -> Self {
        Self {
            user_identifier: user_identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_poll(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
    pub user_identifier: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            user_identifier: String::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub query: String,
    /// Restrict results to one document type
    pub doc_type: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub user_identifier: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            doc_type: None,
            limit: 20,
            offset: 0,
            user_identifier: String::new(),
        }
    }
}
