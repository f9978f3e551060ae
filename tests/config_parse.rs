use pdf_tools::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../pdf-tools.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.guard.max_pages, 2);
    assert!(!cfg.guard.exit_nonzero_on_failure);
    assert!(!cfg.converter.scripts_dir.is_empty());
}

#[test]
fn load_reads_file_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("pdf-tools.toml");
    std::fs::write(&path, "[guard]\nmax_pages = 10\nexit_nonzero_on_failure = true\n").unwrap();

    let cfg = Config::resolve(Some(&path)).unwrap();
    assert_eq!(cfg.guard.max_pages, 10);
    assert!(cfg.guard.exit_nonzero_on_failure);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let err = Config::resolve(Some(std::path::Path::new("/nonexistent/pdf-tools.toml")))
        .unwrap_err();
    assert!(err.to_string().starts_with("reading config: "));
}
