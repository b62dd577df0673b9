//! Command definitions and handlers

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use rusty_gini::config::{DEFAULT_API_ENDPOINT, DEFAULT_USER_CENTER_ENDPOINT};
use rusty_gini::utils::generate_user_identifier;
use rusty_gini::{
    AuthScheme, ClientConfig, Credentials, Endpoints, GiniClient, ListOptions, OAuthGrant,
    PollOptions, Progress, SearchOptions, UploadOptions,
};

#[derive(Parser, Debug)]
#[command(name = "gapicmd", version)]
#[command(about = "Interact with Gini's API service from the command line", long_about = None)]
pub struct Cli {
    /// Gini API client ID
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Gini API client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// User identifier for Basic auth; a random one is generated when unset
    #[arg(long, env = "USER_ID")]
    pub user_id: Option<String>,

    /// Authenticate with the OAuth2 password grant as this user
    #[arg(long, env = "GINI_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for the OAuth2 password grant
    #[arg(long, env = "GINI_PASSWORD", hide_env_values = true, requires = "username")]
    pub password: Option<String>,

    #[arg(long, env = "GINI_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "GINI_USER_CENTER_ENDPOINT", default_value = DEFAULT_USER_CENTER_ENDPOINT)]
    pub user_center_endpoint: String,

    /// Show HTTP requests and responses
    #[arg(short, long)]
    pub debug: bool,

    /// Seconds to wait for processing after an upload
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Milliseconds between status polls, 0 polls back-to-back
    #[arg(long, default_value_t = 0)]
    pub poll_interval: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a document and wait until its processing is complete
    #[command(alias = "u")]
    Upload {
        /// PDF, image or text file to upload
        file: PathBuf,

        /// File name of the submitted document
        #[arg(long, env = "FILENAME")]
        filename: Option<String>,

        /// Doctype hint
        #[arg(long, env = "DOCTYPE")]
        doctype: Option<String>,
    },
    /// Get document details
    #[command(alias = "g")]
    Get { id: String },
    /// List a user's documents
    #[command(alias = "l")]
    List {
        /// Number of documents to return
        #[arg(long, env = "LIMIT", default_value_t = 25)]
        limit: u32,

        /// Start offset
        #[arg(long, env = "OFFSET", default_value_t = 0)]
        offset: u32,
    },
    /// Search a user's documents
    Search {
        query: String,

        /// Only return documents of this type
        #[arg(long = "type")]
        doc_type: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Get a document's extractions
    #[command(alias = "e")]
    Extractions {
        id: String,

        /// Include incubator extractions
        #[arg(long)]
        incubator: bool,
    },
    /// Get a document's layout
    Layout { id: String },
    /// Download the processed document
    Processed {
        id: String,
        /// Where to write the processed file
        output: PathBuf,
    },
    /// Delete a document
    Delete { id: String },
    /// Submit an error report for a document
    Report {
        id: String,

        #[arg(long, default_value = "")]
        summary: String,

        #[arg(long, default_value = "")]
        description: String,
    },
}

impl Cli {
    pub fn client_config(&self) -> Result<ClientConfig> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret)
        else {
            bail!("client-id and client-secret are required (or set CLIENT_ID and CLIENT_SECRET)");
        };

        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => AuthScheme::OAuth2(OAuthGrant::Password {
                username: username.clone(),
                password: password.clone().into(),
            }),
            _ => AuthScheme::BasicAuth,
        };

        Ok(ClientConfig::new(Credentials::new(client_id, client_secret))
            .with_auth(auth)
            .with_endpoints(Endpoints {
                api: self.api_endpoint.clone(),
                user_center: self.user_center_endpoint.clone(),
            }))
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_interval(Duration::from_millis(self.poll_interval))
    }

    /// The configured user identifier, or a freshly generated one.
    pub fn user_identifier(&self) -> String {
        match &self.user_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => {
                let id = generate_user_identifier();
                warn!(
                    user_id = id.as_str(),
                    "No user id given, generated one. Keep it to access your documents later"
                );
                id
            }
        }
    }
}

/// Handle a CLI command
pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let poll = cli.poll_options();
    let user_id = cli.user_identifier();

    let client = GiniClient::connect(config)
        .await
        .context("failed to set up API client")?;

    match cli.command {
        Commands::Upload {
            file,
            filename,
            doctype,
        } => {
            if !tokio::fs::try_exists(&file).await.unwrap_or(false) {
                bail!("cannot find {}", file.display());
            }
            let options = UploadOptions {
                poll,
                file_name: filename,
                doc_type: doctype,
                content_type: None,
                user_identifier: user_id,
            };
            let doc = client
                .upload_file(&file, &options)
                .await
                .with_context(|| format!("failed to upload {}", file.display()))?;

            info!(
                document_id = doc.id.as_str(),
                upload_ms = doc.timing.upload.as_millis() as u64,
                processing_ms = doc.timing.processing.as_millis() as u64,
                total_ms = doc.timing.total().as_millis() as u64,
                "Upload finished"
            );
            print_json(&doc)?;
            if doc.progress == Progress::Error {
                bail!("processing of document {} failed", doc.id);
            }
            Ok(())
        }
        Commands::Get { id } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            print_json(&doc)
        }
        Commands::List { limit, offset } => {
            let docs = client
                .list(&ListOptions {
                    limit,
                    offset,
                    user_identifier: user_id,
                })
                .await?;
            print_json(&docs)
        }
        Commands::Search {
            query,
            doc_type,
            limit,
            offset,
        } => {
            let docs = client
                .search(&SearchOptions {
                    query,
                    doc_type,
                    limit,
                    offset,
                    user_identifier: user_id,
                })
                .await?;
            print_json(&docs)
        }
        Commands::Extractions { id, incubator } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            let extractions = client.extractions(&doc, incubator).await?;
            print_json(&extractions)
        }
        Commands::Layout { id } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            let layout = client.layout(&doc).await?;
            print_json(&layout)
        }
        Commands::Processed { id, output } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            let body = client.processed(&doc).await?;
            tokio::fs::write(&output, &body)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote {} bytes to {}", body.len(), output.display());
            Ok(())
        }
        Commands::Delete { id } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            client.delete(&doc).await?;
            println!("Deleted document {}", doc.id);
            Ok(())
        }
        Commands::Report {
            id,
            summary,
            description,
        } => {
            let doc = client.get(&client.document_url(&id), &user_id).await?;
            client.error_report(&doc, &summary, &description).await?;
            println!("Submitted error report for document {}", doc.id);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("failed to prettify JSON object")?;
    println!("{}", pretty);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["gapicmd", "--client-id", "id", "--client-secret", "secret"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_upload_command_parses() {
        let cli = parse(&["--timeout", "5", "u", "scan.pdf", "--doctype", "Invoice"]);
        match &cli.command {
            Commands::Upload { file, doctype, .. } => {
                assert_eq!(file, &PathBuf::from("scan.pdf"));
                assert_eq!(doctype.as_deref(), Some("Invoice"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.poll_options().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_list_defaults() {
        let cli = parse(&["list"]);
        match cli.command {
            Commands::List { limit, offset } => {
                assert_eq!(limit, 25);
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_basic_auth_is_the_default() {
        let config = parse(&["get", "abc"]).client_config().unwrap();
        assert!(matches!(config.auth, AuthScheme::BasicAuth));
        assert_eq!(config.endpoints.api, DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn test_username_and_password_switch_to_oauth2() {
        let config = parse(&["--username", "me@example.com", "--password", "pw", "get", "abc"])
            .client_config()
            .unwrap();
        assert!(matches!(
            config.auth,
            AuthScheme::OAuth2(OAuthGrant::Password { ref username, .. }) if username == "me@example.com"
        ));
    }

    #[test]
    fn test_username_requires_password() {
        let result = Cli::try_parse_from([
            "gapicmd",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--username",
            "me@example.com",
            "get",
            "abc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_user_identifier_is_generated_when_missing() {
        let cli = parse(&["--user-id", "user-1", "get", "abc"]);
        assert_eq!(cli.user_identifier(), "user-1");

        let cli = parse(&["get", "abc"]);
        assert_eq!(cli.user_identifier().len(), 64);
    }
}
