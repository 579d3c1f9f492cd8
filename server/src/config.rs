use rocket::data::{ByteUnit, Limits};
use rocket::figment::providers::Env;
use rocket::figment::Figment;

use greencart::IngestPolicy;

const FORM_OVERHEAD: u64 = 1024 * 1024;

/// Rocket's own figment (`Rocket.toml`, `ROCKET_*`) plus `GREENCART_*`
/// variables, e.g. `GREENCART_TOKEN_SECRET` or `GREENCART_STORAGE_ROOT`.
pub fn figment() -> Figment {
    rocket::Config::figment().merge(Env::prefixed("GREENCART_").global())
}

/// Body limits large enough for a full batch. Files one byte over the
/// policy still reach the ingestor so it can reject them itself; anything
/// bigger is cut off by Rocket.
pub fn upload_limits(policy: &IngestPolicy) -> Limits {
    let file = policy.max_file_size.saturating_add(1);
    let form = file
        .saturating_mul(policy.max_files as u64 + 1)
        .saturating_add(FORM_OVERHEAD);

    Limits::default()
        .limit("file", ByteUnit::from(file))
        .limit("data-form", ByteUnit::from(form))
}

/// Path component of the public base URL, where stored assets are served.
pub fn mount_path(public_base_url: &str) -> String {
    let path = match public_base_url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => public_base_url,
    };
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_path_from_relative_and_absolute_urls() {
        assert_eq!(mount_path("/uploads"), "/uploads");
        assert_eq!(mount_path("/uploads/"), "/uploads");
        assert_eq!(mount_path("https://cdn.example.com/media/img"), "/media/img");
        assert_eq!(mount_path("http://localhost:8000"), "/");
        assert_eq!(mount_path("uploads"), "/uploads");
    }

    #[test]
    fn limits_leave_room_for_one_oversized_byte() {
        let limits = upload_limits(&IngestPolicy::default());
        assert_eq!(limits.get("file"), Some(ByteUnit::from(5 * 1024 * 1024 + 1u64)));
        assert!(limits.get("data-form").unwrap() > ByteUnit::from(5 * (5 * 1024 * 1024 + 1u64)));
    }
}
