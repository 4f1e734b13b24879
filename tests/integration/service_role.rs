use athenz_testenv::fixtures::{service_role, service_role_binding, USERNAME};
use kube::api::{ListParams, PostParams};
use serial_test::serial;

use super::common::*;

const NS: &str = "istio-test";

/// The Istio RBAC kinds are usable once setup has registered their CRDs.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn service_role_and_binding_round_trip() -> anyhow::Result<()> {
    let env = setup().await;
    create_namespace(&env.client(), NS).await;

    let roles = env.clients().service_roles(NS);
    let bindings = env.clients().service_role_bindings(NS);

    let role = roles.create(&PostParams::default(), &service_role(NS)).await?;
    bindings
        .create(&PostParams::default(), &service_role_binding(NS))
        .await?;

    let listed = bindings.list(&ListParams::default()).await?;
    assert_eq!(listed.items.len(), 1);
    let binding = &listed.items[0];
    assert_eq!(Some(binding.spec.role_ref.name.clone()), role.metadata.name);
    assert_eq!(binding.spec.subjects[0].user.as_deref(), Some(USERNAME));

    env.teardown().await;
    Ok(())
}
