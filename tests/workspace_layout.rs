//! ---
//! otr_section: "15-testing-qa-runbook"
//! otr_subsection: "integration-tests"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Workspace manifest and source header checks."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

const CRATES: [&str; 5] = [
    "otr-common",
    "otr-logging",
    "otr-content",
    "otr-registry",
    "otr-runtime",
];

fn read(path: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let full = Path::new(manifest_dir).join("..").join(path);
    fs::read_to_string(&full)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", full.display(), err))
}

#[test]
fn workspace_lists_every_runtime_crate() {
    let manifest = read("Cargo.toml");
    for name in CRATES {
        assert!(
            manifest.contains(&format!("\"crates/{name}\"")),
            "workspace members must include crates/{name}"
        );
        assert!(
            manifest.contains(&format!("{name} = {{ path = \"crates/{name}\" }}")),
            "workspace dependencies must expose {name} by path"
        );
    }
}

#[test]
fn crate_manifests_use_frontmatter() {
    for name in CRATES {
        let path = format!("crates/{name}/Cargo.toml");
        let content = read(&path);
        assert!(
            content.starts_with("# ---"),
            "{path} must include frontmatter header"
        );
        assert!(
            content.contains("otr_section:"),
            "{path} frontmatter must name its section"
        );
        assert!(
            content.contains(&format!("name = \"{name}\"")),
            "{path} must declare package {name}"
        );
    }
}

#[test]
fn crate_sources_carry_frontmatter() {
    for name in CRATES {
        let path = format!("crates/{name}/src/lib.rs");
        let content = read(&path);
        assert!(
            content.starts_with("//! ---"),
            "{path} must include frontmatter header"
        );
        assert!(
            content.contains("otr_owner:"),
            "{path} frontmatter must name an owner"
        );
    }
}

#[test]
fn readme_documents_deploy_dsl() {
    let readme = read("README.md");
    for needle in ["deploy(", "hold()", "with_new_bundle"] {
        assert!(
            readme.contains(needle),
            "README should document {needle}"
        );
    }
}
