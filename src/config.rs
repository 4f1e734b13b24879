//! Harness configuration.
//!
//! Defaults pin both processes to fixed loopback ports. The only environment
//! input is where to find the `etcd` and `kube-apiserver` binaries, using the
//! same variables as `setup-envtest`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ASSETS_ENV: &str = "KUBEBUILDER_ASSETS";
pub const ETCD_BINARY_ENV: &str = "TEST_ASSET_ETCD";
pub const APISERVER_BINARY_ENV: &str = "TEST_ASSET_KUBE_APISERVER";

/// Directory `setup-envtest` installs into when no override is given.
pub const DEFAULT_ASSETS_DIR: &str = "/usr/local/kubebuilder/bin";

#[derive(Clone, Debug, Default)]
pub struct HarnessConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub timeouts: Timeouts,
}

/// etcd launch settings.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub binary: PathBuf,
    pub name: String,
    pub host: IpAddr,
    pub client_port: u16,
    pub peer_port: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            binary: Path::new(DEFAULT_ASSETS_DIR).join("etcd"),
            name: "integration-etcd".to_string(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            client_port: 2379,
            peer_port: 2380,
        }
    }
}

impl StoreConfig {
    pub fn client_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.client_port)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.peer_port)
    }

    pub fn client_url(&self) -> String {
        format!("http://{}", self.client_addr())
    }

    pub fn peer_url(&self) -> String {
        format!("http://{}", self.peer_addr())
    }
}

/// kube-apiserver launch settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub binary: PathBuf,
    pub bind_address: IpAddr,
    pub secure_port: u16,
    pub service_cluster_ip_range: String,
    pub extra_args: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binary: Path::new(DEFAULT_ASSETS_DIR).join("kube-apiserver"),
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            secure_port: 9999,
            service_cluster_ip_range: "10.0.0.0/24".to_string(),
            extra_args: vec![],
        }
    }
}

impl ServerConfig {
    pub fn url(&self) -> String {
        format!("https://{}", SocketAddr::new(self.bind_address, self.secure_port))
    }
}

/// Bounds on every readiness wait performed during setup and teardown.
#[derive(Clone, Debug)]
pub struct Timeouts {
    pub store_ready: Duration,
    pub server_ready: Duration,
    pub crd_established: Duration,
    pub shutdown: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            store_ready: Duration::from_secs(20),
            server_ready: Duration::from_secs(60),
            crd_established: Duration::from_secs(30),
            shutdown: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl HarnessConfig {
    /// Defaults, with binary locations taken from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve binary locations through `lookup`.
    ///
    /// A per-binary variable wins over the assets directory.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let assets = lookup(ASSETS_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

        config.store.binary = lookup(ETCD_BINARY_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| assets.join("etcd"));
        config.server.binary = lookup(APISERVER_BINARY_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| assets.join("kube-apiserver"));
        config
    }
}
