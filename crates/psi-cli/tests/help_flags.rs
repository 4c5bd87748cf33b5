#[test]
fn help_mentions_global_flags_and_nouns() {
    let output = std::process::Command::new(assert_cmd::cargo::cargo_bin!("psi"))
        .arg("--help")
        .output()
        .expect("run help");
    assert!(output.status.success(), "--help should succeed");
    let text = String::from_utf8_lossy(&output.stdout);

    for needle in ["--data-dir", "--pretty", "order", "inventory", "history"] {
        assert!(
            text.contains(needle),
            "help output should contain '{needle}'"
        );
    }
    assert!(!text.contains("--today"), "--today is hidden");
}
