//! Protocol Buffer definitions and generated code for the NDK and gNMI services.
//!
//! Types are generated by [`tonic-build`] from `proto/ndk.proto` and
//! `proto/gnmi.proto` at build time.

pub mod ndk {
    tonic::include_proto!("ndk");
}

pub mod gnmi {
    tonic::include_proto!("gnmi");
}

mod ndk_ext;
pub use ndk_ext::*;
