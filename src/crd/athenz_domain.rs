use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::zms::SignedDomain;

/// AthenzDomain mirrors one Athenz domain, as synced from ZMS, into the cluster.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "athenz.io",
    version = "v1",
    kind = "AthenzDomain",
    plural = "athenzdomains",
    singular = "athenzdomain",
    shortname = "domain",
    status = "AthenzDomainStatus",
    printcolumn = r#"{"name": "KeyId", "type": "string", "jsonPath": ".spec.keyId"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
pub struct AthenzDomainSpec {
    #[serde(flatten)]
    pub signed_domain: SignedDomain,
}

/// AthenzDomainStatus carries the last sync message reported for the domain.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AthenzDomainStatus {
    #[serde(default)]
    pub message: String,
}
