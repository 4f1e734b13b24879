//! Custom resource definition registration.

use std::time::Duration;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, PostParams};
use kube::runtime::wait::{await_condition, conditions};
use kube::ResourceExt;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Create `crd` and read it back.
///
/// A CRD that is already registered yields [`Error::AlreadyExists`].
pub async fn register_crd(
    api: &Api<CustomResourceDefinition>,
    crd: &CustomResourceDefinition,
) -> Result<CustomResourceDefinition> {
    let name = crd.name_any();
    let created = match api.create(&PostParams::default(), crd).await {
        Ok(created) => created,
        Err(kube::Error::Api(resp)) if resp.code == 409 => {
            return Err(Error::AlreadyExists(name));
        }
        Err(e) => return Err(e.into()),
    };
    info!(%name, uid = ?created.metadata.uid, "created custom resource definition");

    let got = api.get(&name).await?;
    debug!(%name, resource_version = ?got.metadata.resource_version, "read back custom resource definition");
    Ok(got)
}

/// Wait until the API server reports `name` as Established.
pub async fn wait_for_established(
    api: &Api<CustomResourceDefinition>,
    name: &str,
    timeout: Duration,
) -> Result<()> {
    let established = await_condition(api.clone(), name, conditions::is_crd_established());
    match tokio::time::timeout(timeout, established).await {
        Ok(res) => {
            res?;
            debug!(%name, "custom resource definition established");
            Ok(())
        }
        Err(_) => Err(Error::NotReady {
            component: "custom resource definition",
            timeout,
        }),
    }
}

/// Register each CRD in order and wait for it to be served, stopping at the
/// first failure.
pub async fn register_all(
    api: &Api<CustomResourceDefinition>,
    crds: &[CustomResourceDefinition],
    timeout: Duration,
) -> Result<Vec<CustomResourceDefinition>> {
    let mut registered = Vec::with_capacity(crds.len());
    for crd in crds {
        let got = register_crd(api, crd).await?;
        wait_for_established(api, &got.name_any(), timeout).await?;
        registered.push(got);
    }
    Ok(registered)
}
