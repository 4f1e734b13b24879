use serial_test::serial;

use super::common::*;

/// Setup immediately followed by teardown leaves nothing behind.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn setup_then_teardown_removes_work_dir() {
    let env = setup().await;
    let work_dir = env.work_dir().to_path_buf();

    assert!(work_dir.join("etcd").is_dir());
    assert!(env.kubeconfig_path().is_file());
    assert!(env.is_server_running());
    assert_eq!(env.store_endpoint(), "http://127.0.0.1:2379");
    assert_eq!(env.server_url(), "https://127.0.0.1:9999");

    env.teardown().await;
    assert!(!work_dir.exists(), "{} still exists", work_dir.display());
}

/// A second environment can be booted on the same ports once the first is gone.
#[tokio::test]
#[serial]
#[ignore = "requires etcd and kube-apiserver (set KUBEBUILDER_ASSETS)"]
async fn environments_can_be_recreated() {
    let first = setup().await;
    first.teardown().await;

    let second = setup().await;
    let version = second.client().apiserver_version().await.unwrap();
    assert!(!version.git_version.is_empty());
    second.teardown().await;
}
