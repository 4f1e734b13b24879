//! Custom resource types registered against the test API server.

pub mod athenz_domain;
pub mod istio_rbac;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

use athenz_domain::AthenzDomain;
use istio_rbac::{ServiceRole, ServiceRoleBinding};

/// Every CRD the test environment registers, in registration order.
pub fn all() -> Vec<CustomResourceDefinition> {
    vec![
        AthenzDomain::crd(),
        ServiceRole::crd(),
        ServiceRoleBinding::crd(),
    ]
}
