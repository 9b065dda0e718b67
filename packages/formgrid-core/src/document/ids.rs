use uuid::Uuid;

/// Generates a fresh node id such as `field_3f2a…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
