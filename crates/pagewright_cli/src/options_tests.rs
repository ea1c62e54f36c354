use super::*;
use clap::Parser;
use serial_test::serial;
use std::ffi::OsStr;
use test_utils::{samples, DocumentTree};

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    options: GlobalOptions,
}

#[test]
fn defaults_point_at_the_conf_directory() {
    let cli = TestCli::parse_from(["pagewright"]);

    assert_eq!(cli.options.env, None);
    assert_eq!(cli.options.roots, vec![PathBuf::from("conf/pages")]);
    assert_eq!(cli.options.settings, PathBuf::from("conf/sentinel.yml"));
    assert_eq!(cli.options.format, OutputFormat::Pretty);
}

#[test]
fn roots_can_be_repeated() {
    let cli = TestCli::parse_from([
        "pagewright",
        "--root",
        "a",
        "--root",
        "b",
        "--format",
        "json",
        "--env",
        "qa",
    ]);

    assert_eq!(cli.options.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(cli.options.format, OutputFormat::Json);
    assert_eq!(cli.options.env.as_deref(), Some("qa"));
}

#[test]
#[serial]
fn context_uses_the_requested_environment() {
    let tree = DocumentTree::new()
        .unwrap()
        .with_settings(samples::SETTINGS)
        .unwrap();
    let settings = tree.settings_path();
    let root = tree.pages_root();
    let cli = TestCli::parse_from([
        OsStr::new("pagewright"),
        OsStr::new("--settings"),
        settings.as_os_str(),
        OsStr::new("--root"),
        root.as_os_str(),
        OsStr::new("--env"),
        OsStr::new("qa"),
    ]);

    let context = cli.options.context().unwrap();

    assert_eq!(context.environment(), "qa");
    assert_eq!(context.store().browser(), "firefox");
}

#[test]
fn documents_are_listed_across_nested_directories() {
    let tree = DocumentTree::new()
        .unwrap()
        .with_document("login/LoginPage.yml", samples::LOGIN_PAGE)
        .unwrap()
        .with_document("shared/Footer.yml", samples::FOOTER)
        .unwrap();
    let root = tree.pages_root();
    let cli = TestCli::parse_from([OsStr::new("pagewright"), OsStr::new("--root"), root.as_os_str()]);

    let names: Vec<String> = cli
        .options
        .list_documents()
        .unwrap()
        .iter()
        .map(|name| name.to_string())
        .collect();

    assert_eq!(names, vec!["Footer", "LoginPage"]);
}
