//! Sample documents shared by tests.

/// Settings with a `qa` environment and fast polling.
pub const SETTINGS: &str = r#"
configurations:
  default:
    env: localhost
    timeout: 2
    interval: 100
  qa:
    browser: firefox
"#;

/// Login page with a default user, a stage-only user and its form fields.
pub const LOGIN_PAGE: &str = r#"
urls:
  default: http://{env}.myapp.com/login
  stage: https://stage.myapp.com/login
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
  Username:
    elementType: Textbox
    id: username
  Password:
    elementType: Textbox
    name: password
  Log In:
    elementType: Button
    css: "button.primary"
  Remember Me:
    elementType: Checkbox
    id: remember
include: Footer
"#;

/// Shared footer included by other pages.
pub const FOOTER: &str = r#"
elements:
  Privacy Link:
    partialText: Privacy
"#;

/// Registration form exercising every element view.
pub const REGISTRATION_PAGE: &str = r##"
urls:
  default: http://{env}.myapp.com/register
elements:
  first_name:
    elementType: Textbox
    id: fname
  State:
    elementType: Select
    id: state
  Plan:
    elementType: Radiobutton
    xpath: "//input[@value='basic']"
  Results:
    elementType: Table
    id: results
  Submit:
    elementType: Button
    id: missing
    css: "#submit"
testdata:
  default:
    New User:
      first name: Ada
"##;

/// Page whose include chain loops back to itself.
pub const CYCLIC_PAGE: &str = "urls:\n  default: http://{env}.myapp.com/a\ninclude: CyclicPart\n";

/// Part of [`CYCLIC_PAGE`]'s cycle.
pub const CYCLIC_PART: &str = "include: CyclicPage\n";
