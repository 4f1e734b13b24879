//! athenz-testenv: throwaway etcd + kube-apiserver environment for testing
//! the AthenzDomain and Istio RBAC custom resources.
//!
//! [`framework::Framework`] is the entry point: `setup` boots the store and
//! the server, registers the CRDs and hands back typed clients; `teardown`
//! stops everything and removes the working directory.

pub mod apiserver;
pub mod clients;
pub mod config;
pub mod crd;
pub mod error;
pub mod fixtures;
pub mod framework;
pub mod helpers;
mod process;
pub mod register;
pub mod store;
pub mod zms;
