//! Disposable etcd + kube-apiserver environment for integration tests.
//!
//! `setup` brings the pieces up in a fixed order (working directory, etcd,
//! server options, kube-apiserver, readiness, clients, CRDs) and stops at the
//! first failure. Anything already started is torn down when its handle
//! drops: both processes are killed on drop and the working directory is
//! removed on drop.
//!
//! ```no_run
//! # async fn example() -> Result<(), athenz_testenv::error::SetupError> {
//! use athenz_testenv::{config::HarnessConfig, framework::Framework};
//!
//! let env = Framework::setup(HarnessConfig::from_env()).await?;
//! let domains = env.clients().athenz_domains.clone();
//! // ... drive the API ...
//! env.teardown().await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use kube::Client;
use tempfile::TempDir;
use tracing::{info, warn};

use crate::apiserver::{ApiServer, ServerRunOptions};
use crate::clients::Clients;
use crate::config::{HarnessConfig, Timeouts};
use crate::error::{Error, SetupError, SetupStep};
use crate::fixtures;
use crate::register;
use crate::store::EmbeddedStore;

pub const WORK_DIR_PREFIX: &str = "integration_test_etcd_data";

/// One running store + server pair and the clients bound to it.
pub struct Framework {
    work_dir: TempDir,
    store: EmbeddedStore,
    server: ApiServer,
    kube_config: kube::Config,
    clients: Clients,
    timeouts: Timeouts,
}

impl Framework {
    pub async fn setup(config: HarnessConfig) -> Result<Self, SetupError> {
        let work_dir = tempfile::Builder::new()
            .prefix(WORK_DIR_PREFIX)
            .tempdir()
            .map_err(Error::from)
            .map_err(SetupError::at(SetupStep::WorkDir))?;
        info!(dir = %work_dir.path().display(), "allocated working directory");

        let store =
            EmbeddedStore::start(&config.store, work_dir.path().join("etcd"), &config.timeouts)
                .await
                .map_err(SetupError::at(SetupStep::StartStore))?;

        let options = ServerRunOptions::new(
            &config.server,
            vec![store.client_url().to_string()],
            work_dir.path().join("certs"),
        )
        .complete()
        .map_err(SetupError::at(SetupStep::CompleteOptions))?;

        let errs = options.validate();
        if !errs.is_empty() {
            return Err(SetupError {
                step: SetupStep::ValidateOptions,
                source: Error::InvalidOptions(errs),
            });
        }

        let mut server = ApiServer::start(options)
            .await
            .map_err(SetupError::at(SetupStep::StartServer))?;

        let kube_config = server
            .kube_config()
            .await
            .map_err(SetupError::at(SetupStep::Connect))?;
        let client = Client::try_from(kube_config.clone())
            .map_err(Error::from)
            .map_err(SetupError::at(SetupStep::Connect))?;

        server
            .wait_until_ready(
                &client,
                config.timeouts.server_ready,
                config.timeouts.poll_interval,
            )
            .await
            .map_err(SetupError::at(SetupStep::WaitReady))?;

        let clients = Clients::from_client(client);
        register::register_all(
            &clients.crds,
            &fixtures::custom_resource_definitions(),
            config.timeouts.crd_established,
        )
        .await
        .map_err(SetupError::at(SetupStep::RegisterCrds))?;

        info!(
            url = %server.url(),
            etcd_data = %store.data_dir().display(),
            "test environment ready"
        );
        Ok(Self {
            work_dir,
            store,
            server,
            kube_config,
            clients,
            timeouts: config.timeouts,
        })
    }

    /// Stop the server, stop etcd and remove the working directory.
    ///
    /// Failures are logged; the environment is discarded regardless.
    pub async fn teardown(self) {
        let Self {
            work_dir,
            store,
            server,
            timeouts,
            ..
        } = self;

        if let Err(e) = server.shutdown(timeouts.shutdown).await {
            warn!(%e, "failed to stop kube-apiserver");
        }
        if let Err(e) = store.stop().await {
            warn!(%e, "failed to stop etcd");
        }

        let path = work_dir.path().to_path_buf();
        match work_dir.close() {
            Ok(()) => info!(dir = %path.display(), "removed working directory"),
            Err(e) => warn!(%e, dir = %path.display(), "failed to remove working directory"),
        }
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub fn client(&self) -> Client {
        self.clients.client.clone()
    }

    pub fn kube_config(&self) -> &kube::Config {
        &self.kube_config
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn kubeconfig_path(&self) -> PathBuf {
        self.server.kubeconfig_path().to_path_buf()
    }

    pub fn server_url(&self) -> &str {
        self.server.url()
    }

    pub fn store_endpoint(&self) -> &str {
        self.store.client_url()
    }

    pub fn is_server_running(&self) -> bool {
        self.server.is_running()
    }
}
