use super::*;

#[test]
fn blocked_result_shape() {
    let result = ExecResult::blocked("rm -rf /", "'rm' is a dangerous command");
    assert!(!result.ok);
    assert_eq!(result.exit_code, EXIT_BLOCKED);
    assert!(result.was_blocked());
    assert_eq!(result.stderr, "blocked: 'rm' is a dangerous command");
}

#[test]
fn feedback_includes_status_and_output() {
    let result = ExecResult {
        ok: true,
        exit_code: 0,
        stdout: "2 passed".to_string(),
        stderr: String::new(),
        command: "pytest -v".to_string(),
        duration_ms: 120,
    };
    let feedback = result.feedback();
    assert!(feedback.contains("`pytest -v`"));
    assert!(feedback.contains("SUCCESS"));
    assert!(feedback.contains("2 passed"));
    assert!(!feedback.contains("Errors"));
}

#[test]
fn feedback_shows_errors_only_on_failure() {
    let result = ExecResult {
        ok: false,
        exit_code: 1,
        stdout: String::new(),
        stderr: "Traceback (most recent call last)".to_string(),
        command: "python main.py".to_string(),
        duration_ms: 40,
    };
    let feedback = result.feedback();
    assert!(feedback.contains("FAILED"));
    assert!(feedback.contains("Traceback"));
}

#[test]
fn signals_detect_common_patterns() {
    let result = ExecResult {
        ok: false,
        exit_code: 1,
        stdout: "Server listening on :3000".to_string(),
        stderr: "Warning: deprecated API\nError: boom".to_string(),
        command: "npm start".to_string(),
        duration_ms: 5,
    };
    let signals = result.signals();
    assert!(signals.server_started);
    assert!(signals.warning_indicated);
    assert!(signals.error_indicated);
    assert!(!signals.success_indicated);
}

#[test]
fn truncate_respects_char_boundaries() {
    let s = "héllo wörld";
    let t = truncate(s, 3);
    assert!(t.len() <= 3);
    assert!(s.starts_with(t));
}
