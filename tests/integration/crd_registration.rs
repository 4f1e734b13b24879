use athenz_testenv::crd::athenz_domain::AthenzDomain;
use athenz_testenv::error::Error;
use athenz_testenv::fixtures::custom_resource_definitions;
use athenz_testenv::register::register_crd;
use kube::CustomResourceExt;
use serial_test::serial;

use super::common::*;

/// Setup registers every fixed CRD exactly once and each one is served.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn setup_registers_all_crds() {
    let env = setup().await;
    let crds = &env.clients().crds;

    for expected in custom_resource_definitions() {
        let name = expected.metadata.name.clone().unwrap();
        let got = crds.get(&name).await.unwrap();
        assert_eq!(got.spec.group, expected.spec.group);
        assert_eq!(got.spec.scope, expected.spec.scope);

        let established = got
            .status
            .and_then(|s| s.conditions)
            .unwrap_or_default()
            .into_iter()
            .any(|c| c.type_ == "Established" && c.status == "True");
        assert!(established, "{name} is not established");
    }

    env.teardown().await;
}

/// Registering an already registered CRD is reported as AlreadyExists.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn duplicate_registration_is_already_exists() {
    let env = setup().await;

    let err = register_crd(&env.clients().crds, &AthenzDomain::crd())
        .await
        .err()
        .unwrap();
    assert!(
        matches!(err, Error::AlreadyExists(ref name) if name == "athenzdomains.athenz.io"),
        "unexpected error: {err}"
    );
    assert!(err.is_already_exists());

    env.teardown().await;
}

/// The AthenzDomain CRD matches the manifest: cluster scope, athenz.io group.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn athenz_domain_crd_is_cluster_scoped() {
    let env = setup().await;

    let crd = env
        .clients()
        .crds
        .get("athenzdomains.athenz.io")
        .await
        .unwrap();
    assert_eq!(crd.spec.group, "athenz.io");
    assert_eq!(crd.spec.scope, "Cluster");
    assert_eq!(crd.spec.names.kind, "AthenzDomain");
    assert_eq!(crd.spec.names.short_names, Some(vec!["domain".to_string()]));

    env.teardown().await;
}
