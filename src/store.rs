//! Embedded metadata store: a single-member etcd bound to loopback.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Child;
use tracing::{debug, info};

use crate::config::{StoreConfig, Timeouts};
use crate::error::{Error, Result};
use crate::helpers::poll_until;
use crate::process;

const COMPONENT: &str = "etcd";

/// Running etcd process. Dropping the handle kills the process.
pub struct EmbeddedStore {
    child: Child,
    client_url: String,
    data_dir: PathBuf,
}

#[derive(Deserialize)]
struct EtcdHealth {
    health: String,
}

impl EmbeddedStore {
    /// Start etcd with its data in `data_dir` and wait until `/health` reports healthy.
    pub async fn start(
        config: &StoreConfig,
        data_dir: impl Into<PathBuf>,
        timeouts: &Timeouts,
    ) -> Result<Self> {
        let data_dir = data_dir.into();
        process::ensure_port_free(COMPONENT, config.client_addr())?;
        process::ensure_port_free(COMPONENT, config.peer_addr())?;
        tokio::fs::create_dir_all(&data_dir).await?;

        let child = process::spawn(COMPONENT, &config.binary, &etcd_args(config, &data_dir))?;
        let mut store = Self {
            child,
            client_url: config.client_url(),
            data_dir,
        };
        store
            .wait_until_healthy(timeouts.store_ready, timeouts.poll_interval)
            .await?;

        info!(url = %store.client_url, dir = %store.data_dir.display(), "etcd ready");
        Ok(store)
    }

    pub fn client_url(&self) -> &str {
        &self.client_url
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Kill the process and wait for it to exit.
    pub async fn stop(mut self) -> Result<()> {
        self.child.kill().await?;
        info!("etcd stopped");
        Ok(())
    }

    async fn wait_until_healthy(&mut self, timeout: Duration, interval: Duration) -> Result<()> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        let url = format!("{}/health", self.client_url);
        let child = &mut self.child;

        poll_until(COMPONENT, timeout, interval, || {
            let exited = child.try_wait();
            let (http, url) = (&http, url.as_str());
            async move {
                if let Some(status) = exited? {
                    return Err(Error::ProcessExited {
                        component: COMPONENT,
                        status,
                    });
                }
                Ok(probe_health(http, url).await)
            }
        })
        .await?;

        // A healthy answer only counts if our child is still the one serving it.
        if let Some(status) = self.child.try_wait()? {
            return Err(Error::ProcessExited {
                component: COMPONENT,
                status,
            });
        }
        Ok(())
    }
}

async fn probe_health(http: &reqwest::Client, url: &str) -> bool {
    let resp = match http.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            debug!(%e, "etcd health probe failed");
            return false;
        }
    };
    match resp.json::<EtcdHealth>().await {
        Ok(h) => h.health == "true",
        Err(_) => false,
    }
}

/// Command-line flags for a single-member etcd serving on `config`'s ports.
pub fn etcd_args(config: &StoreConfig, data_dir: &Path) -> Vec<String> {
    let client_url = config.client_url();
    let peer_url = config.peer_url();
    vec![
        format!("--name={}", config.name),
        format!("--data-dir={}", data_dir.display()),
        format!("--listen-client-urls={client_url}"),
        format!("--advertise-client-urls={client_url}"),
        format!("--listen-peer-urls={peer_url}"),
        format!("--initial-advertise-peer-urls={peer_url}"),
        format!("--initial-cluster={}={peer_url}", config.name),
        "--unsafe-no-fsync=true".to_string(),
    ]
}
