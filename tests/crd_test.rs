//! Unit tests for the generated custom resource definitions.

use athenz_testenv::crd::athenz_domain::AthenzDomain;
use athenz_testenv::crd::istio_rbac::{ServiceRole, ServiceRoleBinding};
use athenz_testenv::fixtures::custom_resource_definitions;
use kube::{CustomResourceExt, Resource};

#[test]
fn test_athenz_domain_crd_is_cluster_scoped() {
    let crd = AthenzDomain::crd();
    assert_eq!(crd.metadata.name.as_deref(), Some("athenzdomains.athenz.io"));
    assert_eq!(crd.spec.group, "athenz.io");
    assert_eq!(crd.spec.scope, "Cluster");

    let names = &crd.spec.names;
    assert_eq!(names.kind, "AthenzDomain");
    assert_eq!(names.plural, "athenzdomains");
    assert_eq!(names.singular.as_deref(), Some("athenzdomain"));
    assert_eq!(names.list_kind.as_deref(), Some("AthenzDomainList"));
    assert_eq!(names.short_names, Some(vec!["domain".to_string()]));
}

#[test]
fn test_athenz_domain_crd_serves_and_stores_v1() {
    let crd = AthenzDomain::crd();
    assert_eq!(crd.spec.versions.len(), 1);

    let v1 = &crd.spec.versions[0];
    assert_eq!(v1.name, "v1");
    assert!(v1.served);
    assert!(v1.storage);
    assert!(v1.schema.is_some());
}

#[test]
fn test_istio_rbac_crds_are_namespaced_with_categories() {
    let categories = Some(vec!["istio-io".to_string(), "rbac-istio-io".to_string()]);

    let role = ServiceRole::crd();
    assert_eq!(role.metadata.name.as_deref(), Some("serviceroles.rbac.istio.io"));
    assert_eq!(role.spec.scope, "Namespaced");
    assert_eq!(role.spec.versions[0].name, "v1alpha1");
    assert_eq!(role.spec.names.categories, categories);

    let binding = ServiceRoleBinding::crd();
    assert_eq!(
        binding.metadata.name.as_deref(),
        Some("servicerolebindings.rbac.istio.io")
    );
    assert_eq!(binding.spec.scope, "Namespaced");
    assert_eq!(binding.spec.names.kind, "ServiceRoleBinding");
    assert_eq!(binding.spec.names.categories, categories);
}

#[test]
fn test_registration_order_starts_with_athenz_domain() {
    let names: Vec<String> = custom_resource_definitions()
        .into_iter()
        .filter_map(|crd| crd.metadata.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "athenzdomains.athenz.io",
            "serviceroles.rbac.istio.io",
            "servicerolebindings.rbac.istio.io",
        ]
    );
}

#[test]
fn test_resource_api_versions() {
    assert_eq!(AthenzDomain::api_version(&()), "athenz.io/v1");
    assert_eq!(ServiceRole::api_version(&()), "rbac.istio.io/v1alpha1");
    assert_eq!(ServiceRoleBinding::plural(&()), "servicerolebindings");
}
