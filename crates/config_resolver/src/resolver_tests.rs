//! Tests for cascade resolution.

use super::*;
use crate::document::DocumentFormat;
use crate::document_source::InMemoryDocumentSource;

fn name(value: &str) -> DocumentName {
    DocumentName::try_new(value).unwrap()
}

fn resolver(documents: &[(&str, &str)]) -> ConfigResolver {
    let source = documents
        .iter()
        .fold(InMemoryDocumentSource::new(), |source, (name, text)| {
            source.with_document(*name, *text, DocumentFormat::Yaml)
        });
    ConfigResolver::new(Arc::new(DocumentLoader::new(Arc::new(source))))
}

const LOGIN_PAGE: &str = r#"
urls:
  default: http://{env}.myapp.com
  prod: https://myapp.com
accounts:
  default:
    RegularUser:
      username: test
      password: test
  stage:
    StageUser:
      username: StageUserName
      password: BadPassw0rd
elements:
  first_name:
    elementType: Textbox
    id: fname
include: Header
"#;

const HEADER: &str = r#"
accounts:
  default:
    AdminUser:
      username: admin
      password: admin
elements:
  logo:
    id: logo
  first_name:
    id: shadowed
testdata:
  default:
    Puppy Data:
      name: Rex
include: Footer
"#;

const FOOTER: &str = r#"
urls:
  base: http://{env}.footer.example
elements:
  copyright:
    css: .copyright
"#;

fn login_resolver() -> ConfigResolver {
    resolver(&[("LoginPage", LOGIN_PAGE), ("Header", HEADER), ("Footer", FOOTER)])
}

#[tokio::test]
async fn environment_value_wins_over_default() {
    let resolver = login_resolver();

    let url = resolver.resolve_url("prod", &name("LoginPage")).await.unwrap();

    assert_eq!(url.value, "https://myapp.com");
    assert_eq!(url.environment, "prod");
    assert_eq!(url.document.as_str(), "LoginPage");
}

#[tokio::test]
async fn default_value_serves_unknown_environments_with_substitution() {
    let resolver = login_resolver();

    let url = resolver.resolve_url("qa", &name("LoginPage")).await.unwrap();

    assert_eq!(url.value, "http://qa.myapp.com");
    assert_eq!(url.environment, "default");
}

#[tokio::test]
async fn base_url_is_used_when_no_env_or_default() {
    let resolver = resolver(&[("Footer", FOOTER)]);

    let url = resolver.resolve_url("uat", &name("Footer")).await.unwrap();

    assert_eq!(url.value, "http://uat.footer.example");
    assert_eq!(url.environment, "base");
}

#[tokio::test]
async fn malformed_url_is_reported_with_context() {
    let resolver = resolver(&[("Broken", "urls:\n  default: not a url\n")]);

    let err = resolver.resolve_url("qa", &name("Broken")).await.unwrap_err();

    match err {
        ConfigurationError::MalformedUrl {
            document,
            environment,
            url,
            ..
        } => {
            assert_eq!(document, "Broken");
            assert_eq!(environment, "qa");
            assert_eq!(url, "not a url");
        }
        other => panic!("Expected MalformedUrl, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_url_is_not_found() {
    let resolver = resolver(&[("Part", "elements:\n  a:\n    id: a\n")]);

    let err = resolver.resolve_url("qa", &name("Part")).await.unwrap_err();

    assert_eq!(
        err,
        ConfigurationError::NotFound {
            document: "Part".to_string(),
            key: "url".to_string(),
            environment: "qa".to_string(),
        }
    );
}

#[tokio::test]
async fn account_for_named_environment() {
    let resolver = login_resolver();

    let password = resolver
        .resolve("stage", &ConfigKey::account("StageUser", "password"), &name("LoginPage"))
        .await
        .unwrap();

    assert_eq!(password.value, "BadPassw0rd");
    assert_eq!(password.environment, "stage");
}

#[tokio::test]
async fn account_falls_back_to_default_section() {
    let resolver = login_resolver();

    let password = resolver
        .resolve("qa", &ConfigKey::account("RegularUser", "password"), &name("LoginPage"))
        .await
        .unwrap();

    assert_eq!(password.value, "test");
    assert_eq!(password.environment, "default");
}

#[tokio::test]
async fn account_is_not_shared_across_environments() {
    let resolver = login_resolver();

    let err = resolver
        .resolve_account("qa", "StageUser", &name("LoginPage"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::AccountNotFound { .. }));
}

#[tokio::test]
async fn missing_field_in_matched_account_is_not_found() {
    let resolver = login_resolver();

    let err = resolver
        .resolve("stage", &ConfigKey::account("StageUser", "email"), &name("LoginPage"))
        .await
        .unwrap_err();

    match err {
        ConfigurationError::NotFound { key, environment, .. } => {
            assert_eq!(key, "accounts.StageUser.email");
            assert_eq!(environment, "stage");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn accounts_are_found_in_included_parts() {
    let resolver = login_resolver();

    let admin = resolver
        .resolve_account("qa", "AdminUser", &name("LoginPage"))
        .await
        .unwrap();

    assert_eq!(admin.document.as_str(), "Header");
    assert_eq!(admin.fields.get("username").map(String::as_str), Some("admin"));
}

#[tokio::test]
async fn test_data_uses_phrase_names() {
    let resolver = login_resolver();

    let value = resolver
        .resolve("qa", &ConfigKey::test_data("Puppy Data", "name"), &name("LoginPage"))
        .await
        .unwrap();

    assert_eq!(value.value, "Rex");
    assert_eq!(value.document.as_str(), "Header");
}

#[tokio::test]
async fn executable_resolution() {
    let resolver = resolver(&[(
        "Calculator",
        "executables:\n  default: C:/apps/{env}/calc.exe\n  prod: C:/calc.exe\n",
    )]);

    let qa = resolver.resolve_executable("qa", &name("Calculator")).await.unwrap();
    let prod = resolver
        .resolve(&"prod".to_string(), &ConfigKey::Executable, &name("Calculator"))
        .await
        .unwrap();

    assert_eq!(qa.value, "C:/apps/qa/calc.exe");
    assert_eq!(prod.value, "C:/calc.exe");
}

#[tokio::test]
async fn local_element_shadows_included_element() {
    let resolver = login_resolver();

    let element = resolver
        .resolve_element(&name("LoginPage"), "First Name")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(element.name, "first_name");
    assert_eq!(element.document.as_str(), "LoginPage");
    assert_eq!(element.attributes.get("id"), Some("fname"));
}

#[tokio::test]
async fn elements_are_found_depth_first_through_parts() {
    let resolver = login_resolver();

    let element = resolver
        .resolve_element(&name("LoginPage"), "copyright")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(element.document.as_str(), "Footer");
}

#[tokio::test]
async fn undefined_element_is_none() {
    let resolver = login_resolver();

    let element = resolver
        .resolve_element(&name("LoginPage"), "nonexistent")
        .await
        .unwrap();

    assert!(element.is_none());
}

#[tokio::test]
async fn closure_without_elements_is_invalid() {
    let resolver = resolver(&[("Bare", "urls:\n  default: http://bare\n")]);

    let err = resolver
        .resolve_element(&name("Bare"), "anything")
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::InvalidDocument { .. }));
}

#[tokio::test]
async fn include_cycle_is_detected() {
    let resolver = resolver(&[
        ("A", "include: B\nelements:\n  a:\n    id: a\n"),
        ("B", "include: C\n"),
        ("C", "include: A\n"),
    ]);

    let err = resolver.resolve_element(&name("A"), "missing").await.unwrap_err();

    match err {
        ConfigurationError::InvalidDocument { document, reason } => {
            assert_eq!(document, "A");
            assert!(reason.contains("A -> B -> C -> A"), "reason: {}", reason);
        }
        other => panic!("Expected InvalidDocument, got {:?}", other),
    }
}

#[tokio::test]
async fn diamond_includes_are_searched_once() {
    let resolver = resolver(&[
        ("Top", "include: Left, Right\n"),
        ("Left", "include: Shared\n"),
        ("Right", "include: Shared\n"),
        ("Shared", "elements:\n  button:\n    id: b\n"),
    ]);

    let closure = resolver.include_closure(&name("Top")).await.unwrap();
    let names: Vec<&str> = closure.iter().map(|n| n.as_str()).collect();

    assert_eq!(names, vec!["Top", "Left", "Shared", "Right"]);
}

#[tokio::test]
async fn missing_part_fails_resolution() {
    let resolver = resolver(&[("Page", "include: Ghost\n")]);

    let err = resolver.resolve_url("qa", &name("Page")).await.unwrap_err();

    assert!(matches!(err, ConfigurationError::DocumentNotFound { .. }));
}

#[tokio::test]
async fn key_absent_across_closure_is_not_found() {
    let resolver = login_resolver();

    let err = resolver
        .resolve("qa", &ConfigKey::Executable, &name("LoginPage"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::NotFound { .. }));
}

#[tokio::test]
async fn documents_are_loaded_once_across_lookups() {
    let resolver = login_resolver();

    resolver.resolve_element(&name("LoginPage"), "copyright").await.unwrap();
    resolver.resolve_element(&name("LoginPage"), "logo").await.unwrap();

    let stats = resolver.loader().cache_statistics();
    assert_eq!(stats.cache_misses, 3);
    assert_eq!(stats.cached_entries, 3);
}
