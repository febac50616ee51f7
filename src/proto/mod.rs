//! Hand-maintained protobuf message and service bindings.
//!
//! These modules mirror the code `tonic-build` emits so the crate builds
//! without a protoc toolchain. Method paths and field tags are part of the
//! wire contract and must not change:
//!
//! - [`echo`] and [`notifier`] are harness-owned services
//!   (`grpcbench.echo.v1`, `grpcbench.notify.v1`); both ends of those wires
//!   live in this repository.
//! - [`runtime`] mirrors the Dapr runtime v1 surface
//!   (`dapr.proto.runtime.v1`) so the dispatcher can drive a real sidecar.
//!
//! Clients are concrete over [`tonic::transport::Channel`]; an established
//! channel is the collaborator input everywhere in this crate.

pub mod echo;
pub mod notifier;
pub mod runtime;
