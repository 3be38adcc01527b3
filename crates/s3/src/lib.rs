//! blobsync-s3: S3 adapter for the blobsync backup utility
//!
//! Implements the `ObjectStore` trait from blobsync-core on top of
//! aws-sdk-s3, so the sync engine can talk to any S3-compatible endpoint.

mod client;

pub use client::S3Client;
