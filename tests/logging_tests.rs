use booksum::setup_logging;

#[test]
fn test_logging_setup() {
    // Repeated calls must not panic even though the global subscriber can
    // only be installed once
    let result = std::panic::catch_unwind(|| {
        setup_logging();
        setup_logging();
    });

    assert!(result.is_ok(), "setup_logging function should not panic");
}
