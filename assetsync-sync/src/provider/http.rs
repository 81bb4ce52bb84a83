//! Downloads assets over HTTP(S).
//!
//! `url` and `revision-url` are templates: `{key}` placeholders take the
//! percent-encoded value of the same source key (`{environment}`,
//! `{version}`, ...). `access-token` is sent as a bearer token.

use std::io::{Read, Write};

use tracing::{debug, warn};

use assetsync_core::interpolate::interpolate_encoded;
use assetsync_core::{Revision, Source};

use crate::asset::{Asset, FetchedAsset};
use crate::error::{io_err, DownloadFailure, SyncError};
use crate::progress::Progress;
use crate::provider::{archive_suffix, Provider};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct HttpProvider {
    agent: ureq::Agent,
}

impl HttpProvider {
    pub const NAME: &'static str = "http";

    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn get(&self, url: &str, source: &Source) -> Result<ureq::Response, SyncError> {
        let mut request = self.agent.get(url);
        if let Some(token) = source.access_token() {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.call().map_err(|err| SyncError::Download {
            url: url.to_string(),
            kind: failure(err),
        })
    }
}

fn failure(err: ureq::Error) -> DownloadFailure {
    match err {
        ureq::Error::Status(401, _) => DownloadFailure::Unauthorized,
        ureq::Error::Status(404, _) => DownloadFailure::NotFound,
        ureq::Error::Status(status, _) => DownloadFailure::Transport(format!("HTTP {status}")),
        ureq::Error::Transport(transport) => DownloadFailure::Transport(transport.to_string()),
    }
}

/// Compare the received byte count with the announced length, if any.
pub(crate) fn verify_length(expected: Option<u64>, received: u64) -> Result<(), DownloadFailure> {
    match expected {
        Some(expected) if expected != received => {
            Err(DownloadFailure::Verification { expected, received })
        }
        _ => Ok(()),
    }
}

impl Provider for HttpProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn asset_url(&self, source: &Source) -> Result<String, SyncError> {
        Ok(interpolate_encoded(source.url()?, source.definition().values()))
    }

    fn fetch_asset(&self, source: &Source, progress: &mut dyn Progress) -> Result<Asset, SyncError> {
        let url = self.asset_url(source)?;
        debug!("GET {url}");
        let response = self.get(&url, source)?;
        let expected = response
            .header("Content-Length")
            .and_then(|len| len.trim().parse::<u64>().ok());

        let mut file = tempfile::Builder::new()
            .prefix("assetsync-")
            .suffix(archive_suffix(&url))
            .tempfile()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;

        let step = format!("download {url}");
        progress.start(&step, expected);
        let mut reader = response.into_reader();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut received = 0u64;
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) => {
                    progress.finish(&step, false);
                    return Err(SyncError::Download {
                        url,
                        kind: DownloadFailure::Transport(e.to_string()),
                    });
                }
            };
            if let Err(e) = file.write_all(&buffer[..read]) {
                progress.finish(&step, false);
                return Err(io_err(file.path(), e));
            }
            received += read as u64;
            progress.advance(received);
        }
        file.flush().map_err(|e| io_err(file.path(), e))?;

        if let Err(kind) = verify_length(expected, received) {
            progress.finish(&step, false);
            return Err(SyncError::Download { url, kind });
        }
        progress.finish(&step, true);
        debug!("downloaded {received} bytes to {}", file.path().display());

        Ok(Asset::Fetched(FetchedAsset::temporary(
            source.clone(),
            file.into_temp_path(),
        )))
    }

    /// Reads `revision-url`. A 404 or malformed body means unknown, other
    /// failures propagate; without `revision-url` the explicit revision is used.
    fn fetch_revision(&self, source: &Source) -> Result<Option<Revision>, SyncError> {
        let Some(template) = source.revision_url() else {
            return Ok(source.revision());
        };
        let url = interpolate_encoded(template, source.definition().values());
        let response = match self.get(&url, source) {
            Ok(response) => response,
            Err(SyncError::Download {
                kind: DownloadFailure::NotFound,
                ..
            }) => return Ok(None),
            Err(err) => return Err(err),
        };
        let body = response.into_string().map_err(|e| SyncError::Download {
            url: url.clone(),
            kind: DownloadFailure::Transport(e.to_string()),
        })?;
        let first_line = body.lines().next().unwrap_or_default();
        match Revision::new(first_line) {
            Ok(revision) => Ok(Some(revision)),
            Err(err) => {
                warn!("ignoring revision from {url}: {err}");
                Ok(None)
            }
        }
    }
}
