use super::*;

fn issue(risk: Risk) -> Issue {
    Issue {
        risk,
        title: "t".into(),
        description: "d".into(),
        suggested_fix: "f".into(),
    }
}

#[yare::parameterized(
    empty         = { vec![], Verdict::Pass },
    info_only     = { vec![issue(Risk::Info)], Verdict::Pass },
    minor_only    = { vec![issue(Risk::Minor), issue(Risk::Info)], Verdict::Pass },
    one_major     = { vec![issue(Risk::Minor), issue(Risk::Major)], Verdict::ReviewRequired },
    one_critical  = { vec![issue(Risk::Critical)], Verdict::FixRequired },
    critical_wins = { vec![issue(Risk::Major), issue(Risk::Critical)], Verdict::FixRequired },
)]
fn verdict_mapping(issues: Vec<Issue>, expected: Verdict) {
    assert_eq!(Verdict::for_issues(&issues), expected);
}

#[test]
fn only_fix_required_blocks() {
    assert!(Verdict::FixRequired.blocks());
    assert!(!Verdict::ReviewRequired.blocks());
    assert!(!Verdict::Pass.blocks());
}

#[yare::parameterized(
    critical = { "critical", Some(Risk::Critical) },
    spaced   = { "  Major ", Some(Risk::Major) },
    upper    = { "MINOR", Some(Risk::Minor) },
    info     = { "info", Some(Risk::Info) },
    unknown  = { "fatal", None },
)]
fn risk_parsing(input: &str, expected: Option<Risk>) {
    assert_eq!(Risk::parse(input), expected);
}
