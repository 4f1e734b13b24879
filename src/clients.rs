//! Typed API handles built from the test server's connection configuration.

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{Api, Client};

use crate::crd::athenz_domain::AthenzDomain;
use crate::crd::istio_rbac::{ServiceRole, ServiceRoleBinding};
use crate::error::Result;

/// The CRD management client and the AthenzDomain client, sharing one
/// connection.
#[derive(Clone)]
pub struct Clients {
    pub client: Client,
    pub crds: Api<CustomResourceDefinition>,
    pub athenz_domains: Api<AthenzDomain>,
}

impl Clients {
    pub fn new(config: kube::Config) -> Result<Self> {
        Ok(Self::from_client(Client::try_from(config)?))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            crds: Api::all(client.clone()),
            athenz_domains: Api::all(client.clone()),
            client,
        }
    }

    pub fn service_roles(&self, ns: &str) -> Api<ServiceRole> {
        Api::namespaced(self.client.clone(), ns)
    }

    pub fn service_role_bindings(&self, ns: &str) -> Api<ServiceRoleBinding> {
        Api::namespaced(self.client.clone(), ns)
    }
}
