//! kube-apiserver run options: configured, completed, then validated.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::helpers::generate_token;

pub const SA_KEY_FILE: &str = "sa.key";
pub const TOKEN_FILE: &str = "tokens.csv";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_GROUP: &str = "system:masters";

/// Options as configured by the caller, before any files are generated.
#[derive(Clone, Debug)]
pub struct ServerRunOptions {
    pub binary: PathBuf,
    pub bind_address: IpAddr,
    pub secure_port: u16,
    pub etcd_servers: Vec<String>,
    pub cert_dir: PathBuf,
    pub service_cluster_ip_range: String,
    pub extra_args: Vec<String>,
}

impl ServerRunOptions {
    pub fn new(
        config: &ServerConfig,
        etcd_servers: Vec<String>,
        cert_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary: config.binary.clone(),
            bind_address: config.bind_address,
            secure_port: config.secure_port,
            etcd_servers,
            cert_dir: cert_dir.into(),
            service_cluster_ip_range: config.service_cluster_ip_range.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Create the cert dir and generate the service-account signing key and
    /// the static admin token file inside it.
    pub fn complete(self) -> Result<CompletedOptions> {
        std::fs::create_dir_all(&self.cert_dir)?;

        let key = rcgen::KeyPair::generate()?;
        let sa_key_file = self.cert_dir.join(SA_KEY_FILE);
        std::fs::write(&sa_key_file, key.serialize_pem())?;

        let token = generate_token();
        let token_file = self.cert_dir.join(TOKEN_FILE);
        std::fs::write(
            &token_file,
            format!("{token},{ADMIN_USER},{ADMIN_USER},\"{ADMIN_GROUP}\"\n"),
        )?;

        debug!(dir = %self.cert_dir.display(), "generated service-account key and token file");
        Ok(CompletedOptions {
            options: self,
            token,
            sa_key_file,
            token_file,
        })
    }
}

/// Options with every generated file in place, ready to validate and run.
#[derive(Clone, Debug)]
pub struct CompletedOptions {
    options: ServerRunOptions,
    token: String,
    sa_key_file: PathBuf,
    token_file: PathBuf,
}

impl CompletedOptions {
    pub fn options(&self) -> &ServerRunOptions {
        &self.options
    }

    /// Bearer token of the `system:masters` admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn cert_dir(&self) -> &Path {
        &self.options.cert_dir
    }

    pub fn url(&self) -> String {
        format!(
            "https://{}",
            SocketAddr::new(self.advertise_address(), self.options.secure_port)
        )
    }

    /// Address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.options.bind_address, self.options.secure_port)
    }

    /// Every problem with the options; empty when they are usable.
    pub fn validate(&self) -> Vec<String> {
        let o = &self.options;
        let mut errs = Vec::new();

        if o.etcd_servers.is_empty() {
            errs.push("--etcd-servers must be specified".to_string());
        }
        for server in &o.etcd_servers {
            if !is_http_url(server) {
                errs.push(format!("--etcd-servers: {server:?} is not an http(s) URL"));
            }
        }
        if o.secure_port == 0 {
            errs.push("--secure-port must be between 1 and 65535".to_string());
        }
        if !o.cert_dir.is_dir() {
            errs.push(format!(
                "--cert-dir: {} is not a directory",
                o.cert_dir.display()
            ));
        }
        if !is_cidr(&o.service_cluster_ip_range) {
            errs.push(format!(
                "--service-cluster-ip-range: {:?} is not a valid CIDR",
                o.service_cluster_ip_range
            ));
        }
        for file in [&self.sa_key_file, &self.token_file] {
            if !file.is_file() {
                errs.push(format!("{} is missing", file.display()));
            }
        }
        if !o.binary.is_file() {
            errs.push(format!(
                "kube-apiserver binary not found at {}",
                o.binary.display()
            ));
        }
        errs
    }

    /// kube-apiserver command-line flags.
    pub fn args(&self) -> Vec<String> {
        let o = &self.options;
        let sa_key = self.sa_key_file.display();
        let mut args = vec![
            format!("--advertise-address={}", self.advertise_address()),
            format!("--bind-address={}", o.bind_address),
            format!("--secure-port={}", o.secure_port),
            format!("--etcd-servers={}", o.etcd_servers.join(",")),
            format!("--cert-dir={}", o.cert_dir.display()),
            format!("--service-cluster-ip-range={}", o.service_cluster_ip_range),
            format!("--token-auth-file={}", self.token_file.display()),
            "--authorization-mode=AlwaysAllow".to_string(),
            format!("--service-account-issuer={}", self.url()),
            format!("--service-account-key-file={sa_key}"),
            format!("--service-account-signing-key-file={sa_key}"),
            "--disable-admission-plugins=ServiceAccount".to_string(),
            "--allow-privileged=true".to_string(),
        ];
        args.extend(o.extra_args.iter().cloned());
        args
    }

    fn advertise_address(&self) -> IpAddr {
        if self.options.bind_address.is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.options.bind_address
        }
    }
}

fn is_http_url(s: &str) -> bool {
    match s.parse::<http::Uri>() {
        Ok(uri) => {
            matches!(uri.scheme_str(), Some("http") | Some("https")) && uri.authority().is_some()
        }
        Err(_) => false,
    }
}

fn is_cidr(s: &str) -> bool {
    let Some((ip, prefix)) = s.split_once('/') else {
        return false;
    };
    let Ok(ip) = ip.parse::<IpAddr>() else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match ip {
        IpAddr::V4(_) => prefix <= 32,
        IpAddr::V6(_) => prefix <= 128,
    }
}
