use std::time::Duration;

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::ArchiveClient;
use crate::config::ResolvedConfig;
use crate::domain::{Artifact, ProductId, SourceProductId};
use crate::error::HiriseError;
use crate::store::{Metadata, Store};
use crate::url::ArchiveUrl;

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub overwrite: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub items: Vec<FetchItemResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub id: String,
    pub artifact: String,
    pub action: String,
    pub url: String,
    pub local_path: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub downloads: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub id: String,
    pub artifact: Option<String>,
    pub downloaded_at: String,
    pub resolved_path: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<A: ArchiveClient> {
    store: Store,
    archive: A,
}

impl<A: ArchiveClient> App<A> {
    pub fn new(store: Store, archive: A) -> Self {
        Self { store, archive }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Batch fetch: every label and raw source product named by the config,
    /// in order. A failed transfer is reported in its item and the batch
    /// continues past it.
    pub fn fetch(
        &self,
        config: &ResolvedConfig,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, HiriseError> {
        if !options.dry_run {
            self.store.ensure_data_root()?;
        }
        let mut items = Vec::new();
        for label in &config.labels {
            items.push(self.download_label(label, options, sink)?);
        }
        for source in &config.sources {
            items.push(self.download_source(source, options, sink)?);
        }
        Ok(FetchResult { items })
    }

    /// Download the RDR label for a product into `{root}/labels/`.
    pub fn download_label(
        &self,
        product: &ProductId,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchItemResult, HiriseError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; label {product}"),
            elapsed: None,
        });
        let url = product.label_url()?;
        let destination = self.store.label_path(product);
        self.transfer(&product.to_string(), "label", url, destination, options, sink)
    }

    /// Download one raw EDR channel file into `{root}/{obsid}/`.
    pub fn download_source(
        &self,
        source: &SourceProductId,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchItemResult, HiriseError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; source product {source}"),
            elapsed: None,
        });
        let url = source.url()?;
        let destination = self.store.source_product_path(source);
        self.transfer(&source.to_string(), "source", url, destination, options, sink)
    }

    /// Download an EXTRAS artifact (browse, thumbnail, quicklook, ...) into
    /// `{root}/browse/`. Kind/artifact mismatches fail here, before any
    /// network traffic.
    pub fn download_artifact(
        &self,
        product: &ProductId,
        artifact: Artifact,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchItemResult, HiriseError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {artifact} for {product}"),
            elapsed: None,
        });
        if artifact == Artifact::Label {
            return self.download_label(product, options, sink);
        }
        let path = product.artifact_path(artifact)?;
        let url = ArchiveUrl::new(&path)?.url();
        let filename = path
            .rsplit('/')
            .next()
            .ok_or_else(|| HiriseError::Filesystem(format!("no filename in path {path}")))?;
        let destination = self.store.browse_path(filename);
        self.transfer(
            &product.to_string(),
            &artifact.to_string(),
            url,
            destination,
            options,
            sink,
        )
    }

    pub fn list(&self, sink: &dyn ProgressSink) -> Result<ListResult, HiriseError> {
        sink.event(ProgressEvent {
            message: "phase=Resolve; scanning store".to_string(),
            elapsed: None,
        });
        let mut downloads: Vec<ListEntry> = self
            .store
            .list_metadata()?
            .into_iter()
            .map(|meta| ListEntry {
                id: meta.id,
                artifact: meta.artifact,
                downloaded_at: meta.downloaded_at,
                resolved_path: meta.resolved_path,
            })
            .collect();
        downloads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ListResult { downloads })
    }

    fn transfer(
        &self,
        id: &str,
        artifact: &str,
        url: String,
        destination: Utf8PathBuf,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchItemResult, HiriseError> {
        // Existing file without --overwrite is a success, not an error.
        if Store::exists(&destination) && !options.overwrite {
            warn!(path = %destination, "file exists, skipping download");
            sink.event(ProgressEvent {
                message: "phase=Store; already downloaded".to_string(),
                elapsed: None,
            });
            return Ok(FetchItemResult {
                id: id.to_string(),
                artifact: artifact.to_string(),
                action: "exists".to_string(),
                url,
                local_path: destination.to_string(),
                error: None,
            });
        }

        if options.dry_run {
            return Ok(FetchItemResult {
                id: id.to_string(),
                artifact: artifact.to_string(),
                action: "dry-run".to_string(),
                url,
                local_path: destination.to_string(),
                error: None,
            });
        }

        Store::ensure_parent(&destination)?;
        sink.event(ProgressEvent {
            message: "archive.request".to_string(),
            elapsed: None,
        });
        info!(%url, path = %destination, "downloading");
        let start = std::time::Instant::now();
        let outcome = self.archive.fetch(&url, destination.as_std_path());
        let latency = start.elapsed().as_millis();
        sink.event(ProgressEvent {
            message: format!("archive.response latency_ms={latency}"),
            elapsed: None,
        });

        if let Err(err) = outcome {
            warn!(%url, error = %err, "transfer failed");
            return Ok(FetchItemResult {
                id: id.to_string(),
                artifact: artifact.to_string(),
                action: "error".to_string(),
                url,
                local_path: destination.to_string(),
                error: Some(err.to_string()),
            });
        }

        sink.event(ProgressEvent {
            message: "phase=Store; writing metadata".to_string(),
            elapsed: None,
        });
        let meta = Metadata {
            id: id.to_string(),
            artifact: Some(artifact.to_string()),
            url: url.clone(),
            downloaded_at: chrono::Utc::now().to_rfc3339(),
            tool: format!("hirise-dl/{}", env!("CARGO_PKG_VERSION")),
            resolved_path: destination.to_string(),
        };
        Store::write_metadata(&self.store.metadata_path(&format!("{id}.{artifact}")), &meta)?;

        Ok(FetchItemResult {
            id: id.to_string(),
            artifact: artifact.to_string(),
            action: "download".to_string(),
            url,
            local_path: destination.to_string(),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use camino::Utf8PathBuf;

    use super::*;
    use crate::output::JsonOutput;

    #[derive(Default)]
    struct MockArchive {
        calls: Mutex<usize>,
        fail: bool,
    }

    impl ArchiveClient for MockArchive {
        fn fetch(&self, url: &str, destination: &Path) -> Result<(), HiriseError> {
            let mut guard = self.calls.lock().unwrap();
            *guard += 1;
            if self.fail {
                return Err(HiriseError::ArchiveStatus {
                    status: 404,
                    url: url.to_string(),
                });
            }
            std::fs::write(destination, b"data")
                .map_err(|err| HiriseError::Filesystem(err.to_string()))
        }
    }

    fn test_app(fail: bool) -> (tempfile::TempDir, App<MockArchive>) {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("hirise")).unwrap();
        let store = Store::with_root(root);
        let app = App::new(
            store,
            MockArchive {
                calls: Mutex::new(0),
                fail,
            },
        );
        (temp, app)
    }

    #[test]
    fn download_source_is_idempotent() {
        let (_temp, app) = test_app(false);
        let spid: SourceProductId = "PSP_003092_0985_RED4_0".parse().unwrap();
        let options = FetchOptions::default();

        let first = app.download_source(&spid, options, &JsonOutput).unwrap();
        assert_eq!(first.action, "download");
        let second = app.download_source(&spid, options, &JsonOutput).unwrap();
        assert_eq!(second.action, "exists");
        assert_eq!(second.local_path, first.local_path);
        assert_eq!(*app.archive.calls.lock().unwrap(), 1);
    }

    #[test]
    fn transfer_failure_is_reported_not_raised() {
        let (_temp, app) = test_app(true);
        let spid: SourceProductId = "PSP_003092_0985_RED4_0".parse().unwrap();

        let item = app
            .download_source(&spid, FetchOptions::default(), &JsonOutput)
            .unwrap();
        assert_eq!(item.action, "error");
        assert!(item.error.is_some());
    }
}
