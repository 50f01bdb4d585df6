//! Affiliate request signing.
//!
//! The upstream API authenticates server-to-server calls with a shared
//! secret wrapped around the sorted, concatenated request parameters.

use md5::{Digest, Md5};

/// Sign a parameter set with the shared secret.
///
/// Parameter keys are sorted lexicographically, each `key` + `value` pair is
/// concatenated, the secret is prepended and appended, and the MD5 digest is
/// returned as uppercase hex. Insertion order of `params` does not affect
/// the result.
pub fn sign(params: &[(String, String)], secret: &str) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (key, value) in sorted {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(secret.as_bytes());
    hex::encode_upper(hasher.finalize())
}
