use athenz_testenv::crd::athenz_domain::AthenzDomain;
use athenz_testenv::fixtures::{admin_role_name, athenz_domain, DOMAIN_NAME, USERNAME};
use athenz_testenv::helpers::wait_for;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::ResourceExt;
use serial_test::serial;

use super::common::*;

/// List is empty before any create and holds exactly the created record after.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn list_before_and_after_create() -> anyhow::Result<()> {
    let env = setup().await;
    let api = &env.clients().athenz_domains;

    let before = api.list(&ListParams::default()).await?;
    assert!(before.items.is_empty());

    let created = api
        .create(&PostParams::default(), &athenz_domain(DOMAIN_NAME))
        .await?;

    let after = api.list(&ListParams::default()).await?;
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.items[0].name_any(), DOMAIN_NAME);
    assert_eq!(after.items[0].spec, created.spec);

    env.teardown().await;
    Ok(())
}

/// Create `home.foo`, read it back by name, and find `user.foo` in the admin role.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn created_domain_is_retrievable_by_name() -> anyhow::Result<()> {
    let env = setup().await;
    let work_dir = env.work_dir().to_path_buf();
    let api = &env.clients().athenz_domains;

    let fixture = athenz_domain(DOMAIN_NAME);
    api.create(&PostParams::default(), &fixture).await?;

    let got = api.get(DOMAIN_NAME).await?;
    assert_eq!(got.spec, fixture.spec);

    let admin = got
        .spec
        .signed_domain
        .domain
        .role(&admin_role_name())
        .expect("admin role missing");
    assert_eq!(admin.member_names(), vec![USERNAME]);

    env.teardown().await;
    assert!(!work_dir.exists());
    Ok(())
}

/// The record is cluster-scoped and removable through the same client.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn delete_removes_domain() -> anyhow::Result<()> {
    let env = setup().await;
    let api: Api<AthenzDomain> = env.clients().athenz_domains.clone();

    let created = api
        .create(&PostParams::default(), &athenz_domain(DOMAIN_NAME))
        .await?;
    assert_eq!(created.namespace(), None);

    api.delete(DOMAIN_NAME, &DeleteParams::default()).await?;
    let gone = wait_for(TIMEOUT, POLL, || {
        let api = api.clone();
        async move { api.get_opt(DOMAIN_NAME).await.ok().flatten().is_none() }
    })
    .await;
    assert!(gone, "{DOMAIN_NAME} was never deleted");

    env.teardown().await;
    Ok(())
}
