#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    const SECRET: &str = "cli-test-secret-cli-test-secret-cli";

    fn greencart(storage: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin("greencart").expect("binary should build");
        cmd.env_remove("GREENCART_TOKEN_SECRET")
            .env_remove("GREENCART_PUBLIC_BASE_URL")
            .env("GREENCART_STORAGE_ROOT", storage.path());
        cmd
    }

    fn issue(storage: &TempDir, payload: &str, ttl: &str) -> String {
        let output = greencart(storage)
            .args(["--secret", SECRET, "token", "issue", "--payload", payload, "--ttl", ttl])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    #[test]
    fn test_token_issue_and_verify() {
        let storage = TempDir::new().unwrap();
        let token = issue(&storage, r#"{"userId":"42"}"#, "3600");

        greencart(&storage)
            .env("GREENCART_TOKEN_SECRET", SECRET)
            .args(["token", "verify", &token])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""userId":"42""#));
    }

    #[test]
    fn test_expired_token_fails() {
        let storage = TempDir::new().unwrap();
        let token = issue(&storage, r#"{"userId":"42"}"#, "0");

        greencart(&storage)
            .args(["--secret", SECRET, "token", "verify", &token])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid or expired token"));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let storage = TempDir::new().unwrap();
        greencart(&storage)
            .args(["token", "issue", "--payload", "{}"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("token_secret"));
    }

    #[test]
    fn test_upload_and_list() {
        let storage = TempDir::new().unwrap();
        let inputs = TempDir::new().unwrap();
        let image = inputs.path().join("photo.PNG");
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0u8; 64]);
        std::fs::write(&image, &png).unwrap();

        greencart(&storage)
            .arg("upload")
            .arg(&image)
            .assert()
            .success()
            .stdout(predicate::str::starts_with("/uploads/").and(predicate::str::contains(".png")));

        greencart(&storage)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("image/png").and(predicate::str::contains("72")));
    }

    #[test]
    fn test_upload_rejects_non_images() {
        let storage = TempDir::new().unwrap();
        let inputs = TempDir::new().unwrap();
        let text = inputs.path().join("notes.txt");
        std::fs::write(&text, b"plain text").unwrap();

        greencart(&storage)
            .arg("upload")
            .arg(&text)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported media type"));

        let stored: Vec<_> = std::fs::read_dir(storage.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .collect();
        assert!(stored.is_empty());
    }
}
