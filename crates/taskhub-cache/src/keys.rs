//! Key builders for every entry TaskHub writes to the store.

/// Namespace holding rotation credential → user id associations.
const ROTATION_NAMESPACE: &str = "user_keys";

/// Store key for a rotation credential.
pub fn rotation_credential(token: &str) -> String {
    format!("{ROTATION_NAMESPACE}:{token}")
}
