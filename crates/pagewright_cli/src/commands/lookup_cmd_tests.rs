use super::*;
use config_resolver::ConfigurationError;
use serial_test::serial;
use test_utils::{samples, DocumentTree};

const CALCULATOR: &str = "executables:\n  default: C:/Windows/System32/calc.exe\n";

fn tree() -> DocumentTree {
    DocumentTree::new()
        .unwrap()
        .with_settings(samples::SETTINGS)
        .unwrap()
        .with_document("LoginPage.yml", samples::LOGIN_PAGE)
        .unwrap()
        .with_document("shared/Footer.yml", samples::FOOTER)
        .unwrap()
        .with_document("desktop/Calculator.yml", CALCULATOR)
        .unwrap()
}

#[tokio::test]
#[serial]
async fn url_reports_where_the_value_came_from() {
    let tree = tree();
    let context = tree.context().unwrap();
    context.set_environment("qa");

    let info = location_info(&context, "Login Page").await.unwrap();

    assert_eq!(
        info,
        LocationInfo {
            page: "LoginPage".to_string(),
            kind: "url".to_string(),
            location: "http://qa.myapp.com/login".to_string(),
            environment: "qa".to_string(),
            section: "default".to_string(),
            source: "LoginPage".to_string(),
        }
    );
}

#[tokio::test]
#[serial]
async fn desktop_pages_report_their_executable() {
    let tree = tree();
    let context = tree.context().unwrap();

    let info = location_info(&context, "Calculator").await.unwrap();

    assert_eq!(info.kind, "executable");
    assert_eq!(info.location, "C:/Windows/System32/calc.exe");
}

#[tokio::test]
#[serial]
async fn accounts_resolve_wholesale_or_by_field() {
    let tree = tree();
    let context = tree.context().unwrap();
    context.set_environment("stage");

    let whole = account_info(&context, "LoginPage", "StageUser", None).await.unwrap();
    let password = account_info(&context, "LoginPage", "StageUser", Some("password"))
        .await
        .unwrap();

    assert_eq!(whole.section, "stage");
    assert_eq!(whole.fields.len(), 2);
    assert_eq!(whole.fields["username"], "StageUserName");
    assert_eq!(
        password.fields,
        BTreeMap::from([("password".to_string(), "BadPassw0rd".to_string())])
    );
}

#[tokio::test]
#[serial]
async fn missing_accounts_are_configuration_errors() {
    let tree = tree();
    let context = tree.context().unwrap();

    let err = account_info(&context, "LoginPage", "StageUser", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::AccountNotFound { .. })
    ));
}

#[tokio::test]
#[serial]
async fn elements_show_kind_and_selector_order() {
    let tree = tree();
    let context = tree.context().unwrap();

    let info = element_info(&context, "LoginPage", "Privacy Link", false)
        .await
        .unwrap();

    assert_eq!(info.element, "privacy_link");
    assert_eq!(info.source, "Footer");
    assert_eq!(info.kind, "Element");
    assert_eq!(info.element_type, None);
    assert_eq!(info.selectors, vec!["partialtext=Privacy"]);
}

#[tokio::test]
#[serial]
async fn undefined_elements_are_reported() {
    let tree = tree();
    let context = tree.context().unwrap();

    let err = element_info(&context, "LoginPage", "Nope", false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Element(ElementError::NotFoundInConfiguration { .. })
    ));
}

#[tokio::test]
#[serial]
async fn settings_follow_the_environment() {
    let tree = tree();
    let context = tree.context().unwrap();
    context.set_environment("qa");

    let browser = setting_info(&context, "browser");
    let missing = setting_info(&context, "proxy");

    assert_eq!(browser.value.as_deref(), Some("firefox"));
    assert_eq!(missing.value, None);
}

#[test]
fn formats_render_json_and_text() {
    colored::control::set_override(false);
    let info = ElementInfo {
        page: "LoginPage".to_string(),
        element: "username".to_string(),
        source: "LoginPage".to_string(),
        kind: "Textbox".to_string(),
        element_type: Some("Textbox".to_string()),
        selectors: vec!["id=username".to_string(), "name=user".to_string()],
    };

    let pretty = format_element(&info, OutputFormat::Pretty).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&format_element(&info, OutputFormat::Json).unwrap()).unwrap();

    assert_eq!(
        pretty,
        "username LoginPage\nKind: Textbox (elementType: Textbox)\nSelectors:\n  id=username\n  name=user"
    );
    assert_eq!(json["selectors"][1], "name=user");

    let unset = SettingInfo {
        key: "proxy".to_string(),
        environment: "qa".to_string(),
        value: None,
    };
    assert_eq!(format_setting(&unset, OutputFormat::Pretty).unwrap(), "proxy (not set)");
}
