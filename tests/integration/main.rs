//! Integration tests against a real etcd + kube-apiserver pair.
//!
//! Each test boots its own environment through `Framework::setup` and tears
//! it down at the end. The listener ports are fixed, so tests run serially.
//! The shared helpers live in `common.rs`.
//!
//! Requirements: `etcd` and `kube-apiserver` binaries, located through
//! `KUBEBUILDER_ASSETS` (e.g. `setup-envtest use -p path`).
//! Run with: `cargo test --test integration -- --ignored`

mod common;

mod athenz_domain;
mod crd_registration;
mod lifecycle;
mod service_role;
