//! Tests for the per-page element cache.

use super::*;
use crate::browser::{BrowserError, BrowserResult, NodeHandle, Selector, SelectorKind};
use crate::element_types::ElementKind;
use crate::errors::HarnessError;
use async_trait::async_trait;
use config_resolver::{
    ConfigStore, ConfigurationError, DocumentFormat, InMemoryDocumentSource,
};

/// Resolution never touches the browser.
struct DetachedBrowser;

#[async_trait]
impl Browser for DetachedBrowser {
    async fn find_node(&self, _selector: &Selector) -> BrowserResult<NodeHandle> {
        Err(BrowserError::SessionClosed)
    }

    async fn find_nodes_within(
        &self,
        _parent: &NodeHandle,
        _selector: &Selector,
    ) -> BrowserResult<Vec<NodeHandle>> {
        Err(BrowserError::SessionClosed)
    }

    async fn click(&self, _node: &NodeHandle) -> BrowserResult<()> {
        Err(BrowserError::SessionClosed)
    }

    async fn text(&self, _node: &NodeHandle) -> BrowserResult<String> {
        Err(BrowserError::SessionClosed)
    }

    async fn attribute(&self, _node: &NodeHandle, _name: &str) -> BrowserResult<Option<String>> {
        Err(BrowserError::SessionClosed)
    }

    async fn is_visible(&self, _node: &NodeHandle) -> BrowserResult<bool> {
        Err(BrowserError::SessionClosed)
    }

    async fn is_enabled(&self, _node: &NodeHandle) -> BrowserResult<bool> {
        Err(BrowserError::SessionClosed)
    }

    async fn is_selected(&self, _node: &NodeHandle) -> BrowserResult<bool> {
        Err(BrowserError::SessionClosed)
    }

    async fn clear(&self, _node: &NodeHandle) -> BrowserResult<()> {
        Err(BrowserError::SessionClosed)
    }

    async fn send_keys(&self, _node: &NodeHandle, _text: &str) -> BrowserResult<()> {
        Err(BrowserError::SessionClosed)
    }

    async fn navigate(&self, _url: &str) -> BrowserResult<()> {
        Err(BrowserError::SessionClosed)
    }

    async fn current_url(&self) -> BrowserResult<String> {
        Err(BrowserError::SessionClosed)
    }

    async fn ready_state(&self) -> BrowserResult<String> {
        Err(BrowserError::SessionClosed)
    }
}

const REGISTRATION_PAGE: &str = r#"
urls:
  default: http://{env}.myapp.com/register
elements:
  first_name:
    elementType: Textbox
    id: fname
  state:
    elementType: Select
    name: state
  banner:
    elementType: Carousel
    css: .banner
include: Header
"#;

const HEADER: &str = r#"
elements:
  logout_link:
    xpath: //a[text()='Log out']
"#;

const ABOUT_PAGE: &str = "urls:\n  default: http://myapp.com/about\n";

fn registry_with(page: &str, types: ElementTypeRegistry) -> ElementRegistry {
    let source = InMemoryDocumentSource::new()
        .with_document("RegistrationPage", REGISTRATION_PAGE, DocumentFormat::Yaml)
        .with_document("Header", HEADER, DocumentFormat::Yaml)
        .with_document("AboutPage", ABOUT_PAGE, DocumentFormat::Yaml);
    let context = TestContext::new(ConfigStore::default(), Arc::new(source)).unwrap();
    ElementRegistry::new(
        DocumentName::try_new(page).unwrap(),
        Arc::new(context),
        Arc::new(DetachedBrowser),
        Arc::new(types),
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn equivalent_names_return_the_same_handle() {
    let registry = registry_with("RegistrationPage", ElementTypeRegistry::new());

    let first = registry.get("First Name").await.unwrap();
    let second = registry.get("first_name").await.unwrap();
    let third = registry.get("  FIRST   name ").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(registry.cached_count(), 1);
    assert!(registry.contains("first name"));
}

#[tokio::test]
async fn element_type_selects_the_kind() {
    let registry = registry_with("RegistrationPage", ElementTypeRegistry::new());

    let first_name = registry.get("First Name").await.unwrap();
    let state = registry.get("State").await.unwrap();

    assert_eq!(first_name.kind(), ElementKind::Textbox);
    assert_eq!(
        first_name.descriptor().selectors,
        vec![Selector::new(SelectorKind::Id, "fname")]
    );
    assert!(first_name.as_textbox().is_ok());
    assert!(matches!(
        first_name.as_selectable(),
        Err(ElementError::TypeMismatch { .. })
    ));
    assert_eq!(state.kind(), ElementKind::Select);
}

#[tokio::test]
async fn elements_of_included_parts_are_found() {
    let registry = registry_with("RegistrationPage", ElementTypeRegistry::new());

    let logout = registry.get("Logout Link").await.unwrap();

    assert_eq!(logout.kind(), ElementKind::Generic);
    assert_eq!(logout.descriptor().document.as_str(), "Header");
}

#[tokio::test]
async fn undefined_element_is_not_found_in_configuration() {
    let registry = registry_with("RegistrationPage", ElementTypeRegistry::new());

    let err = registry.get("Middle Name").await.unwrap_err();

    assert_eq!(
        err,
        HarnessError::Element(ElementError::NotFoundInConfiguration {
            element: "middle_name".to_string(),
            document: "RegistrationPage".to_string(),
        })
    );
    assert_eq!(registry.cached_count(), 0);
}

#[tokio::test]
async fn page_without_elements_is_an_invalid_document() {
    let registry = registry_with("AboutPage", ElementTypeRegistry::new());

    let err = registry.get("Title").await.unwrap_err();

    assert!(matches!(
        err,
        HarnessError::Configuration(ConfigurationError::InvalidDocument { .. })
    ));
}

#[tokio::test]
async fn unknown_type_depends_on_registry_mode() {
    let lenient = registry_with("RegistrationPage", ElementTypeRegistry::new());
    let strict = registry_with("RegistrationPage", ElementTypeRegistry::strict());

    assert_eq!(
        lenient.get("banner").await.unwrap().kind(),
        ElementKind::Generic
    );
    assert!(matches!(
        strict.get("banner").await.unwrap_err(),
        HarnessError::Element(ElementError::UnknownElementType { .. })
    ));
}
