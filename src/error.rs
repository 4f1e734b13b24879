use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wait error: {0}")]
    Wait(#[from] kube::runtime::wait::Error),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("Key generation error: {0}")]
    Pki(#[from] rcgen::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid server options: {}", .0.join("; "))]
    InvalidOptions(Vec<String>),

    #[error("{component} not ready after {timeout:?}")]
    NotReady {
        component: &'static str,
        timeout: Duration,
    },

    #[error("{component} exited before becoming ready ({status})")]
    ProcessExited {
        component: &'static str,
        status: ExitStatus,
    },

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),
}

/// Short alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the API server rejected a create because the object exists.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists(_) => true,
            Self::Kube(kube::Error::Api(resp)) => resp.code == 409,
            _ => false,
        }
    }
}

/// The phase of [`crate::framework::Framework::setup`] that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupStep {
    WorkDir,
    StartStore,
    CompleteOptions,
    ValidateOptions,
    StartServer,
    Connect,
    WaitReady,
    RegisterCrds,
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WorkDir => "allocate working directory",
            Self::StartStore => "start etcd",
            Self::CompleteOptions => "complete server options",
            Self::ValidateOptions => "validate server options",
            Self::StartServer => "start kube-apiserver",
            Self::Connect => "build client configuration",
            Self::WaitReady => "wait for kube-apiserver readiness",
            Self::RegisterCrds => "register custom resource definitions",
        };
        f.write_str(s)
    }
}

/// Single error surfaced by a failed environment setup.
#[derive(Error, Debug)]
#[error("test environment setup failed: {step}: {source}")]
pub struct SetupError {
    pub step: SetupStep,
    #[source]
    pub source: Error,
}

impl SetupError {
    /// Adapter for `map_err` that tags an [`Error`] with the failing step.
    pub fn at(step: SetupStep) -> impl FnOnce(Error) -> SetupError {
        move |source| SetupError { step, source }
    }
}
