use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── ServiceRole ───────────────────────────────────────────────────────────────

/// ServiceRole lists the access rules granted by one Istio RBAC role.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "rbac.istio.io",
    version = "v1alpha1",
    kind = "ServiceRole",
    plural = "serviceroles",
    singular = "servicerole",
    category = "istio-io",
    category = "rbac-istio-io",
    namespaced
)]
pub struct ServiceRoleSpec {
    #[serde(default)]
    pub rules: Vec<AccessRule>,
}

/// AccessRule matches requests by service, path and method.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AccessRule {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Constraint {
    pub key: String,
    #[serde(default)]
    pub values: Vec<String>,
}

// ── ServiceRoleBinding ────────────────────────────────────────────────────────

/// ServiceRoleBinding grants a ServiceRole to a set of subjects.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "rbac.istio.io",
    version = "v1alpha1",
    kind = "ServiceRoleBinding",
    plural = "servicerolebindings",
    singular = "servicerolebinding",
    category = "istio-io",
    category = "rbac-istio-io",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRoleBindingSpec {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub role_ref: RoleRef,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// RoleRef points at the ServiceRole being bound, by kind and name.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RoleRef {
    pub kind: String,
    pub name: String,
}

impl RoleRef {
    pub fn service_role(name: impl Into<String>) -> Self {
        Self {
            kind: "ServiceRole".to_string(),
            name: name.into(),
        }
    }
}
