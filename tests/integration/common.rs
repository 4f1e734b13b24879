//! Shared helpers for the integration tests.

use std::time::Duration;

use athenz_testenv::config::HarnessConfig;
use athenz_testenv::framework::Framework;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, PostParams};
use kube::Client;
use serde_json::json;
use tracing_subscriber::EnvFilter;

pub const TIMEOUT: Duration = Duration::from_secs(30);
pub const POLL: Duration = Duration::from_millis(500);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn,athenz_testenv=debug"))
        .with_test_writer()
        .try_init();
}

/// Boot a fresh environment, failing the test if any setup step fails.
pub async fn setup() -> Framework {
    init_tracing();
    Framework::setup(HarnessConfig::from_env())
        .await
        .unwrap_or_else(|e| panic!("{e}"))
}

/// Create a namespace for namespaced custom resources.
pub async fn create_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let ns: Namespace = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name }
    }))
    .unwrap();
    api.create(&PostParams::default(), &ns)
        .await
        .expect("failed to create namespace");
}
