//! Hard-coded request bodies for the objects under test.

use std::collections::BTreeMap;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::ObjectMeta;

use crate::crd::athenz_domain::{AthenzDomain, AthenzDomainSpec, AthenzDomainStatus};
use crate::crd::istio_rbac::{
    AccessRule, RoleRef, ServiceRole, ServiceRoleBinding, ServiceRoleBindingSpec,
    ServiceRoleSpec, Subject,
};
use crate::zms::{
    Assertion, AssertionEffect, DomainData, DomainPolicies, Policy, Role, RoleMember,
    SignedDomain, SignedPolicies, Timestamp,
};

pub const DOMAIN_NAME: &str = "home.foo";
pub const USERNAME: &str = "user.foo";
pub const TRUST_DOMAIN: &str = "parent.domain";
pub const FIXTURE_TIMESTAMP: &str = "2019-06-21T19:28:09.305Z";

pub fn admin_role_name() -> String {
    format!("{DOMAIN_NAME}:role.admin")
}

pub fn trust_role_name() -> String {
    format!("{DOMAIN_NAME}:role.trust")
}

pub fn admin_policy_name() -> String {
    format!("{DOMAIN_NAME}:policy.admin")
}

/// The fixed modification time stamped on every fixture object.
///
/// # Panics
///
/// Panics if [`FIXTURE_TIMESTAMP`] is not a valid RFC 3339 timestamp.
pub fn fixture_timestamp() -> Timestamp {
    Timestamp::parse(FIXTURE_TIMESTAMP).expect("fixture timestamp literal is valid RFC 3339")
}

/// The custom resource definitions registered by every test environment.
pub fn custom_resource_definitions() -> Vec<CustomResourceDefinition> {
    crate::crd::all()
}

/// A populated signed domain for `home.foo`: one admin role holding
/// `user.foo`, one trust role, and one policy allowing the admin role
/// everything under `home.foo.test`.
pub fn fake_signed_domain() -> SignedDomain {
    let timestamp = fixture_timestamp();

    SignedDomain {
        domain: DomainData {
            name: DOMAIN_NAME.to_string(),
            modified: timestamp,
            enabled: None,
            roles: vec![
                Role {
                    name: admin_role_name(),
                    modified: Some(timestamp),
                    members: vec![USERNAME.to_string()],
                    role_members: vec![RoleMember {
                        member_name: USERNAME.to_string(),
                        expiration: None,
                    }],
                    trust: None,
                },
                Role {
                    name: trust_role_name(),
                    modified: Some(timestamp),
                    members: vec![],
                    role_members: vec![],
                    trust: Some(TRUST_DOMAIN.to_string()),
                },
            ],
            policies: Some(SignedPolicies {
                contents: DomainPolicies {
                    domain: DOMAIN_NAME.to_string(),
                    policies: vec![Policy {
                        name: admin_policy_name(),
                        modified: Some(timestamp),
                        assertions: vec![Assertion {
                            role: admin_role_name(),
                            resource: format!("{DOMAIN_NAME}.test:*"),
                            action: "*".to_string(),
                            effect: Some(AssertionEffect::Allow),
                        }],
                    }],
                },
                signature: "signature-policy".to_string(),
                key_id: "col-env-1.1".to_string(),
            }),
            services: vec![],
            entities: vec![],
        },
        signature: "signature".to_string(),
        key_id: "colo-env-1.1".to_string(),
    }
}

/// Wrap [`fake_signed_domain`] in an `AthenzDomain` named `name`.
pub fn athenz_domain(name: &str) -> AthenzDomain {
    AthenzDomain {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: AthenzDomainSpec {
            signed_domain: fake_signed_domain(),
        },
        status: Some(AthenzDomainStatus::default()),
    }
}

/// Istio RBAC role equivalent of the `home.foo` admin policy.
pub fn service_role(ns: &str) -> ServiceRole {
    ServiceRole {
        metadata: ObjectMeta {
            name: Some("admin".to_string()),
            namespace: Some(ns.to_string()),
            ..Default::default()
        },
        spec: ServiceRoleSpec {
            rules: vec![AccessRule {
                services: vec!["*".to_string()],
                methods: vec!["*".to_string()],
                ..Default::default()
            }],
        },
    }
}

/// Binds [`service_role`] to the `home.foo` admin role member.
pub fn service_role_binding(ns: &str) -> ServiceRoleBinding {
    ServiceRoleBinding {
        metadata: ObjectMeta {
            name: Some("admin".to_string()),
            namespace: Some(ns.to_string()),
            ..Default::default()
        },
        spec: ServiceRoleBindingSpec {
            subjects: vec![Subject {
                user: Some(USERNAME.to_string()),
                properties: BTreeMap::new(),
            }],
            role_ref: RoleRef::service_role("admin"),
        },
    }
}
