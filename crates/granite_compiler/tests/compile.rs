//! End-to-end catalog compilation against a real manifest tree.

use granite_compiler::{CatalogCompiler, CompilerConfig, MemoryFactProvider};
use granite_core::{Facts, ResourceRef, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_tree(dir: &TempDir, site: &str) -> CompilerConfig {
    let manifests = dir.path().join("manifests");
    let modules = dir.path().join("modules");
    fs::create_dir_all(&manifests).unwrap();
    fs::create_dir_all(&modules).unwrap();
    fs::write(manifests.join("site.gr"), site).unwrap();
    CompilerConfig::new(modules, manifests)
}

fn compiler(config: CompilerConfig) -> CatalogCompiler {
    let registry = granite_types::builtin_registry().unwrap();
    CatalogCompiler::new(config, Arc::new(registry))
}

fn debian_facts() -> Facts {
    [("osfamily", "Debian"), ("hostname", "web1")]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_single_resource_catalog() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"
        node "web1.example.com" {
            file { "/etc/motd":
                ensure  => present,
                content => "welcome, os is ${osfamily}",
            }
        }
        "#,
    );

    let catalog = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap();

    assert_eq!(catalog.len(), 1);
    assert!(catalog.warnings.is_empty());
    assert!(catalog.edges.is_empty());

    let file = catalog
        .get(&ResourceRef::new("file", "/etc/motd"))
        .unwrap();
    assert_eq!(
        file.get("content"),
        Some(&Value::string("welcome, os is Debian"))
    );
    // Filled in by the file type's pipeline
    assert_eq!(file.get("path"), Some(&Value::string("/etc/motd")));
    assert_eq!(file.get("backup"), Some(&Value::string(".bak")));
}

#[tokio::test]
async fn test_dependency_ordering_across_types() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"
        package { "nginx": ensure => installed }
        file { "/etc/nginx/nginx.conf":
            content => template("nginx.conf for ${hostname}"),
            after   => Package["nginx"],
        }
        service { "nginx":
            ensure    => running,
            subscribe => File["/etc/nginx/nginx.conf"],
        }
        "#,
    );

    let compiler = compiler(config);
    let catalog = compiler
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap();

    assert_eq!(catalog.len(), 3);

    let conf = ResourceRef::new("file", "/etc/nginx/nginx.conf");
    assert!(catalog.edges[&conf].contains(&ResourceRef::new("package", "nginx")));
    assert!(catalog.edges[&ResourceRef::new("service", "nginx")].contains(&conf));

    // Template rendering was timed
    assert_eq!(compiler.metrics().rendering.count(), 1);
}

#[tokio::test]
async fn test_unresolved_reference_fails_compilation() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"
        service { "nginx":
            ensure => running,
            after  => Package["nginx"],
        }
        "#,
    );

    let err = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unresolved_reference");
}

#[tokio::test]
async fn test_syntax_error_names_file_and_line() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(&dir, "file { \"/etc/motd\"\n  ensure => present\n}\n");

    let err = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap_err();
    let location = err.location().unwrap();
    assert!(
        location
            .file
            .as_deref()
            .is_some_and(|f| f.ends_with("site.gr"))
    );
    assert_eq!(location.line, 2);
}

#[tokio::test]
async fn test_duplicate_identity_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"
        file { "/etc/motd": content => "a" }
        file { "/etc/motd": content => "b" }
        "#,
    );

    let err = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "duplicate_resource");
}

#[tokio::test]
async fn test_unknown_fact_surfaces_as_warning() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"file { "/etc/rack": content => "rack ${rack_id}" }"#,
    );

    let catalog = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap();
    assert_eq!(catalog.warnings.len(), 1);
    assert!(catalog.warnings[0].contains("rack_id"));
}

#[tokio::test]
async fn test_many_nodes_compile_concurrently() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(
        &dir,
        r#"
        node "web1" { service { "nginx": ensure => running } }
        node default { service { "sshd": ensure => running } }
        "#,
    );

    let provider = MemoryFactProvider::new()
        .with_node("web1", debian_facts())
        .with_node("db1", debian_facts());
    let compiler = compiler(config).with_fact_provider(Arc::new(provider));

    let nodes: Vec<String> = vec!["web1".to_string(), "db1".to_string()];
    let outcomes = compiler.compile_nodes(&nodes).await;

    assert_eq!(outcomes.len(), 2);
    for (node, outcome) in outcomes {
        let catalog = outcome.unwrap();
        assert_eq!(catalog.node, node);
        assert_eq!(catalog.len(), 1);
    }

    // Both nodes parsed the same site manifest through one cache entry
    assert_eq!(compiler.metrics().parsing.count(), 1);
}

#[tokio::test]
async fn test_catalog_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let config = write_tree(&dir, r#"file { "/etc/motd": content => "hi" }"#);

    let catalog = compiler(config)
        .compile("web1.example.com", &debian_facts())
        .await
        .unwrap();

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json["node"], "web1.example.com");
    assert!(json["resources"]["File[/etc/motd]"].is_object());
}
