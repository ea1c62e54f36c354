//! Tests for the filesystem document source.

use super::*;
use std::fs;
use tempfile::TempDir;

fn name(value: &str) -> DocumentName {
    DocumentName::try_new(value).unwrap()
}

fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn loads_document_from_nested_directory() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "pages/login/LoginPage.yml",
        "urls:\n  default: http://localhost\n",
    );
    let source = FileSystemDocumentSource::new([dir.path()]);

    let doc = source.load_document(&name("LoginPage")).await.unwrap();

    assert_eq!(doc.name().as_str(), "LoginPage");
    assert_eq!(doc.url("default"), Some("http://localhost"));
}

#[tokio::test]
async fn loads_toml_documents() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Api.toml", "[urls]\ndefault = \"http://api\"\n");
    let source = FileSystemDocumentSource::new([dir.path()]);

    let doc = source.load_document(&name("Api")).await.unwrap();
    assert_eq!(doc.url("default"), Some("http://api"));
}

#[tokio::test]
async fn missing_document_lists_searched_roots() {
    let dir = TempDir::new().unwrap();
    let source = FileSystemDocumentSource::new([dir.path()]);

    let err = source.load_document(&name("Nowhere")).await.unwrap_err();

    match err {
        ConfigurationError::DocumentNotFound { document, searched } => {
            assert_eq!(document, "Nowhere");
            assert!(searched.contains(&dir.path().display().to_string()));
        }
        other => panic!("Expected DocumentNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn file_name_match_is_exact() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loginpage.yml", "");
    write(dir.path(), "LoginPage.yml.bak", "");
    let source = FileSystemDocumentSource::new([dir.path()]);

    assert!(!source.document_exists(&name("LoginPage")).await.unwrap());
    assert!(source.document_exists(&name("loginpage")).await.unwrap());
}

#[test]
fn earlier_roots_win() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let expected = write(first.path(), "Header.yml", "");
    write(second.path(), "Header.yml", "");

    let source = FileSystemDocumentSource::new([first.path(), second.path()]);

    assert_eq!(source.locate(&name("Header")).unwrap(), expected);
}

#[test]
fn preferred_extension_wins_within_a_root() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/Header.toml", "");
    write(dir.path(), "b/Header.yaml", "");
    let expected = write(dir.path(), "c/Header.yml", "");
    let source = FileSystemDocumentSource::new([dir.path()]);

    assert_eq!(source.locate(&name("Header")).unwrap(), expected);
}

#[test]
fn walk_order_breaks_extension_ties() {
    let dir = TempDir::new().unwrap();
    let expected = write(dir.path(), "a/Header.yml", "");
    write(dir.path(), "b/Header.yml", "");
    let source = FileSystemDocumentSource::new([dir.path()]);

    assert_eq!(source.locate(&name("Header")).unwrap(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn filesystem_loads_work_on_a_multi_threaded_runtime() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "nested/Header.toml", "[elements.logo]\nid = \"logo\"\n");
    let source = FileSystemDocumentSource::new([dir.path()]);

    let header = name("Header");
    let (document, exists) = tokio::join!(
        source.load_document(&header),
        source.document_exists(&header)
    );

    assert!(document.unwrap().element("logo").is_some());
    assert!(exists.unwrap());
}

#[test]
fn missing_roots_are_skipped() {
    let dir = TempDir::new().unwrap();
    let expected = write(dir.path(), "Header.yaml", "");
    let source = FileSystemDocumentSource::new([dir.path().join("absent"), dir.path().to_path_buf()]);

    assert_eq!(source.locate(&name("Header")).unwrap(), expected);
    assert_eq!(source.roots().len(), 2);
}

#[tokio::test]
async fn invalid_document_is_reported_on_load() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "Hybrid.yml",
        "urls:\n  default: http://a\nexecutables:\n  default: b.exe\n",
    );
    let source = FileSystemDocumentSource::new([dir.path()]);

    let err = source.load_document(&name("Hybrid")).await.unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDocument { .. }));
}

#[test]
fn list_documents_collects_valid_names() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "LoginPage.yml", "");
    write(dir.path(), "parts/Header.toml", "");
    write(dir.path(), "parts/Header.yaml", "");
    write(dir.path(), "notes.txt", "");
    write(dir.path(), ".hidden.yml", "");

    let source = FileSystemDocumentSource::new([dir.path()]);
    let names: Vec<String> = source
        .list_documents()
        .unwrap()
        .into_iter()
        .map(DocumentName::into_inner)
        .collect();

    assert_eq!(names, vec!["Header".to_string(), "LoginPage".to_string()]);
}

#[tokio::test]
async fn in_memory_source_parses_on_load() {
    let mut source = InMemoryDocumentSource::new();
    source.insert("Header", "elements:\n  logo:\n    id: logo\n", DocumentFormat::Yaml);

    assert_eq!(source.len(), 1);
    assert!(source.document_exists(&name("Header")).await.unwrap());
    assert!(source
        .load_document(&name("Header"))
        .await
        .unwrap()
        .element("Logo")
        .is_some());

    let err = source.load_document(&name("Footer")).await.unwrap_err();
    assert!(matches!(err, ConfigurationError::DocumentNotFound { .. }));
}
