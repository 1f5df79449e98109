//! Integration tests for the mhp binary

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Isolated config, storage and cache directories
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();
            let config = format!(
                "[storage]\ndir = {:?}\n\n[offline]\ncache_dir = {:?}\nscope_url = \"http://127.0.0.1:9/\"\ntimeout_secs = 2\n",
                root.join("storage"),
                root.join("caches"),
            );
            std::fs::write(root.join("config.toml"), config).unwrap();
            Self { dir }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn config_path(&self) -> PathBuf {
            self.path().join("config.toml")
        }

        fn mhp(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("mhp");
            cmd.env("MHP_CONFIG", self.config_path())
                .env("MHP_NON_INTERACTIVE", "1")
                .env_remove("RUST_LOG");
            cmd
        }

        fn items(&self) -> serde_json::Value {
            let output = self
                .mhp()
                .args(["cart", "show", "--format", "json"])
                .output()
                .unwrap();
            assert!(output.status.success());
            serde_json::from_slice(&output.stdout).unwrap()
        }
    }

    #[test]
    fn help_displays() {
        Sandbox::new()
            .mhp()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("order list"));
    }

    #[test]
    fn version_displays() {
        Sandbox::new()
            .mhp()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mhp"));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .mhp()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        Sandbox::new()
            .mhp()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[organization]"))
            .stdout(predicate::str::contains("timeout_secs = 2"));
    }

    #[test]
    fn config_set_and_unknown_key() {
        let sandbox = Sandbox::new();
        sandbox
            .mhp()
            .args(["config", "set", "organization.contact_phone", "+1 (555) 010-2000"])
            .assert()
            .success();

        let saved = std::fs::read_to_string(sandbox.config_path()).unwrap();
        assert!(saved.contains("+1 (555) 010-2000"));

        sandbox
            .mhp()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
    }

    #[test]
    fn empty_cart_shows_message() {
        Sandbox::new()
            .mhp()
            .args(["cart", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Your order list is empty"));
    }

    #[test]
    fn add_merges_and_persists() {
        let sandbox = Sandbox::new();
        sandbox
            .mhp()
            .args(["cart", "add", "MS-001", "-q", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("added to order list"));
        sandbox.mhp().args(["cart", "add", "MS-001"]).assert().success();

        let items = sandbox.items();
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "MS-001");
        assert_eq!(items[0]["quantity"], 3);

        sandbox
            .mhp()
            .args(["cart", "total"])
            .assert()
            .success()
            .stdout(predicate::str::contains("$16.50"));
    }

    #[test]
    fn unknown_product_fails_with_hint() {
        Sandbox::new()
            .mhp()
            .args(["cart", "add", "XX-999"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Product not found in catalog: XX-999"))
            .stderr(predicate::str::contains("mhp catalog list"));
    }

    #[test]
    fn add_item_sanitizes_and_coerces() {
        let sandbox = Sandbox::new();
        sandbox
            .mhp()
            .args([
                "cart", "add-item", "--id", "X1", "--name", "<b>Tape</b>", "--price", "-4",
                "--quantity", "abc",
            ])
            .assert()
            .success();

        let items = sandbox.items();
        assert_eq!(items[0]["name"], "&lt;b&gt;Tape&lt;/b&gt;");
        assert_eq!(items[0]["price"], 0.0);
        assert_eq!(items[0]["quantity"], 1);
    }

    #[test]
    fn update_floors_quantity_and_remove_deletes() {
        let sandbox = Sandbox::new();
        sandbox.mhp().args(["cart", "add", "PH-001"]).assert().success();

        sandbox
            .mhp()
            .args(["cart", "update", "PH-001", "-5"])
            .assert()
            .success();
        assert_eq!(sandbox.items()[0]["quantity"], 1);

        sandbox
            .mhp()
            .args(["cart", "update", "PH-001", "4"])
            .assert()
            .success();
        assert_eq!(sandbox.items()[0]["quantity"], 4);

        sandbox
            .mhp()
            .args(["cart", "remove", "PH-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("removed from order list"));
        assert!(sandbox.items().as_array().unwrap().is_empty());

        sandbox
            .mhp()
            .args(["cart", "remove", "PH-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("is not in the order list"));
    }

    #[test]
    fn clear_empties_the_list() {
        let sandbox = Sandbox::new();
        sandbox.mhp().args(["cart", "add", "MS-001"]).assert().success();
        sandbox.mhp().args(["cart", "add", "OS-001"]).assert().success();

        sandbox
            .mhp()
            .args(["cart", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Order list cleared"));
        assert!(sandbox.items().as_array().unwrap().is_empty());
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let sandbox = Sandbox::new();
        let storage = sandbox.path().join("storage");
        std::fs::create_dir_all(&storage).unwrap();
        std::fs::write(storage.join("mh_procurement_cart.json"), "{not json").unwrap();

        assert!(sandbox.items().as_array().unwrap().is_empty());
    }

    #[test]
    fn catalog_lists_products() {
        Sandbox::new()
            .mhp()
            .args(["catalog", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("MS-001"))
            .stdout(predicate::str::contains("OS-002"));
    }

    #[test]
    fn catalog_search_reports_matches() {
        Sandbox::new()
            .mhp()
            .args(["catalog", "search", "gauze"])
            .assert()
            .success()
            .stdout(predicate::str::contains("matching \"gauze\""))
            .stdout(predicate::str::contains("MS-001"));
    }

    #[test]
    fn catalog_search_without_matches_warns() {
        Sandbox::new()
            .mhp()
            .args(["catalog", "search", "zzzz-nothing"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No products found for \"zzzz-nothing\""));
    }

    #[test]
    fn contact_rejects_missing_fields() {
        Sandbox::new()
            .mhp()
            .args(["contact", "--name", "Dana", "--email", "dana@example.org"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Please fill in all required fields"))
            .stderr(predicate::str::contains("Message not sent"));
    }

    #[test]
    fn contact_rejects_invalid_email() {
        Sandbox::new()
            .mhp()
            .args(["contact", "--name", "Dana", "--email", "dana@nowhere", "--message", "Hi"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Please enter a valid email address"));
    }

    #[test]
    fn contact_accepts_valid_form() {
        Sandbox::new()
            .mhp()
            .args([
                "contact", "--name", "Dana", "--email", "dana@example.org", "--message",
                "Need gloves",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Your message has been sent"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn export_writes_pdf() {
        let sandbox = Sandbox::new();
        let out = sandbox.path().join("out");
        sandbox.mhp().args(["cart", "add", "LE-001"]).assert().success();

        sandbox
            .mhp()
            .args(["export", "--no-logo", "--output-dir"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Order form PDF generated successfully"));

        let pdf = std::fs::read(out.join("MH_Procurement_Order_Form.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn offline_manifest_resolves_against_scope() {
        Sandbox::new()
            .mhp()
            .args(["offline", "manifest"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mh-procurement-cache-v1"))
            .stdout(predicate::str::contains("http://127.0.0.1:9/index.html"));
    }

    #[test]
    fn offline_status_before_install() {
        Sandbox::new()
            .mhp()
            .args(["offline", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("uninstalled"));
    }

    #[test]
    fn offline_install_failure_leaves_no_caches() {
        let sandbox = Sandbox::new();
        let manifest = sandbox.path().join("manifest.toml");
        std::fs::write(
            &manifest,
            "cache_name = \"test-v1\"\nurls = [\"./index.html\"]\n",
        )
        .unwrap();

        sandbox
            .mhp()
            .args(["offline", "install", "--manifest"])
            .arg(&manifest)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Offline install of test-v1 failed"));

        sandbox
            .mhp()
            .args(["offline", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("uninstalled"));
    }
}
