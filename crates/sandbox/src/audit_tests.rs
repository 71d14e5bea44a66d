use super::*;

fn result(command: &str, ok: bool) -> ExecResult {
    ExecResult {
        ok,
        exit_code: if ok { 0 } else { 1 },
        stdout: String::new(),
        stderr: if ok { String::new() } else { "boom\nmore".to_string() },
        command: command.to_string(),
        duration_ms: 10,
    }
}

#[test]
fn ring_evicts_oldest_beyond_capacity() {
    let audit = CommandAudit::new(3);
    for i in 0..5 {
        audit.record(&result(&format!("echo {i}"), true));
    }
    assert_eq!(audit.len(), 3);
    let recent = audit.recent(10);
    assert_eq!(recent[0].command, "echo 2");
    assert_eq!(recent[2].command, "echo 4");
}

#[test]
fn recent_limits_and_keeps_order() {
    let audit = CommandAudit::new(10);
    audit.record(&result("echo a", true));
    audit.record(&result("echo b", true));
    audit.record(&result("echo c", true));
    let recent = audit.recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].command, "echo b");
    assert_eq!(recent[1].command, "echo c");
}

#[test]
fn failures_keep_their_first_error_line() {
    let audit = CommandAudit::new(10);
    audit.record(&result("python main.py", false));
    let recent = audit.recent(1);
    assert_eq!(recent[0].error_line.as_deref(), Some("boom"));
}

#[test]
fn history_context_renders_markdown() {
    let audit = CommandAudit::new(10);
    assert_eq!(audit.history_context(), "No commands executed yet.");
    audit.record(&result("pytest -v", false));
    let context = audit.history_context();
    assert!(context.contains("## Recent Commands"));
    assert!(context.contains("[failed] `pytest -v`"));
    assert!(context.contains("error: boom"));
}
