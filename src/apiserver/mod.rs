//! kube-apiserver launcher.
//!
//! The server runs as a child process watched by a supervisor task. The
//! supervisor kills it when the shutdown channel fires or its sender is
//! dropped, so an `ApiServer` that goes out of scope never leaks a process.

pub mod options;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use serde_json::json;
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::helpers::poll_until;
use crate::process;

pub use options::{CompletedOptions, ServerRunOptions};

const COMPONENT: &str = "kube-apiserver";
pub const KUBECONFIG_FILE: &str = "kubeconfig";
const CONTEXT_NAME: &str = "integration";
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ApiServer {
    url: String,
    kubeconfig: serde_json::Value,
    kubeconfig_path: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    supervisor: JoinHandle<io::Result<ExitStatus>>,
    exited: Option<ExitStatus>,
}

impl ApiServer {
    /// Spawn kube-apiserver with already validated options.
    ///
    /// Returns as soon as the process is running; use
    /// [`ApiServer::wait_until_ready`] before issuing requests.
    pub async fn start(options: CompletedOptions) -> Result<Self> {
        process::ensure_port_free(COMPONENT, options.socket_addr())?;
        let child = process::spawn(COMPONENT, &options.options().binary, &options.args())?;
        let (tx, rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(child, rx));

        let url = options.url();
        let kubeconfig = render_kubeconfig(&url, options.token());
        let kubeconfig_path = options.cert_dir().join(KUBECONFIG_FILE);
        tokio::fs::write(&kubeconfig_path, serde_yaml::to_string(&kubeconfig)?).await?;

        info!(%url, kubeconfig = %kubeconfig_path.display(), "kube-apiserver starting");
        Ok(Self {
            url,
            kubeconfig,
            kubeconfig_path,
            shutdown: Some(tx),
            supervisor,
            exited: None,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Kubeconfig written next to the generated certificates, for kubectl.
    pub fn kubeconfig_path(&self) -> &Path {
        &self.kubeconfig_path
    }

    pub fn kubeconfig(&self) -> Result<Kubeconfig> {
        Ok(serde_json::from_value(self.kubeconfig.clone())?)
    }

    /// Connection configuration for clients of this server.
    pub async fn kube_config(&self) -> Result<kube::Config> {
        let config =
            kube::Config::from_custom_kubeconfig(self.kubeconfig()?, &KubeConfigOptions::default())
                .await?;
        Ok(config)
    }

    pub fn is_running(&self) -> bool {
        self.exited.is_none() && !self.supervisor.is_finished()
    }

    /// Poll `/readyz` until the server answers `ok`.
    pub async fn wait_until_ready(
        &mut self,
        client: &Client,
        timeout: Duration,
        interval: Duration,
    ) -> Result<()> {
        let start = Instant::now();
        let supervisor = &self.supervisor;
        poll_until(COMPONENT, timeout, interval, || {
            let exited = supervisor.is_finished();
            async move { Ok(exited || probe_readyz(client).await) }
        })
        .await?;

        if self.supervisor.is_finished() {
            let status = self.reap().await?;
            return Err(Error::ProcessExited {
                component: COMPONENT,
                status,
            });
        }
        info!(elapsed = ?start.elapsed(), "kube-apiserver ready");
        Ok(())
    }

    /// Signal shutdown and wait up to `timeout` for the process to exit.
    pub async fn shutdown(mut self, timeout: Duration) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            // The receiver is gone only if the supervisor already finished.
            let _ = tx.send(());
        }
        if self.exited.is_some() {
            return Ok(());
        }
        match tokio::time::timeout(timeout, self.reap()).await {
            Ok(status) => {
                let status = status?;
                info!(%status, "kube-apiserver stopped");
                Ok(())
            }
            Err(_) => Err(Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{COMPONENT} did not exit within {timeout:?}"),
            ))),
        }
    }

    async fn reap(&mut self) -> Result<ExitStatus> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        let status = (&mut self.supervisor).await.map_err(io::Error::other)??;
        self.exited = Some(status);
        Ok(status)
    }
}

async fn supervise(mut child: Child, shutdown: oneshot::Receiver<()>) -> io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => {
            let status = status?;
            warn!(%status, "kube-apiserver exited on its own");
            Ok(status)
        }
        _ = shutdown => {
            child.kill().await?;
            child.wait().await
        }
    }
}

async fn probe_readyz(client: &Client) -> bool {
    let req = match http::Request::get("/readyz").body(Vec::new()) {
        Ok(req) => req,
        Err(_) => return false,
    };
    match tokio::time::timeout(PROBE_TIMEOUT, client.request_text(req)).await {
        Ok(Ok(body)) => body.trim() == "ok",
        Ok(Err(e)) => {
            debug!(%e, "readyz probe failed");
            false
        }
        Err(_) => {
            debug!(timeout = ?PROBE_TIMEOUT, "readyz probe timed out");
            false
        }
    }
}

/// Kubeconfig for the admin token user. The serving certificate is
/// self-signed by kube-apiserver, so verification is skipped.
pub fn render_kubeconfig(server_url: &str, token: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": CONTEXT_NAME,
            "cluster": {
                "server": server_url,
                "insecure-skip-tls-verify": true,
            }
        }],
        "users": [{
            "name": options::ADMIN_USER,
            "user": { "token": token }
        }],
        "contexts": [{
            "name": CONTEXT_NAME,
            "context": {
                "cluster": CONTEXT_NAME,
                "user": options::ADMIN_USER,
            }
        }],
        "current-context": CONTEXT_NAME,
    })
}
