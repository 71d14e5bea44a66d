use super::*;
use mar_adapters::FakeLlm;
use mar_core::FakeClock;

const TS: u64 = 1_700_000_000_000;

fn recycler(dir: &tempfile::TempDir, max_tokens: usize) -> Recycler {
    let notes = DomainNotes::new(dir.path().join("context"));
    notes.ensure().unwrap();
    Recycler::new(
        notes,
        RecycleConfig {
            max_tokens,
            threshold: 0.75,
            note_tail_bytes: 3_000,
        },
    )
}

fn objective(text: &str) -> Objective {
    Objective::new(text, &FakeClock::new())
}

#[test]
fn threshold_boundary_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 1_000); // threshold at 750
    recycler.observe(749);
    assert!(!recycler.needs_recycle());
    recycler.observe(1);
    assert!(recycler.needs_recycle(), "exactly 750 must trigger");
}

#[test]
fn token_count_is_chars_over_four() {
    assert_eq!(count_tokens("abcd".repeat(10).as_str()), 10);
    assert_eq!(count_tokens("abc"), 0);
}

#[tokio::test]
async fn recycle_files_summary_and_resets_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 100);
    recycler.observe(100);
    assert!(recycler.needs_recycle());

    let llm = FakeLlm::with_script(vec![
        "Built the backend api and the database schema. Frontend not started.",
    ]);
    let obj = objective("build a web app");
    let continuation = recycler
        .recycle(
            &llm,
            &obj,
            &["set up the backend".to_string()],
            &["build the ui".to_string()],
            TS,
        )
        .await
        .unwrap();

    // summary filed into decisions
    let decisions = recycler.notes().read(mar_storage::Domain::Decisions);
    assert!(decisions.contains("RECYCLE SUMMARY"));
    assert!(decisions.contains("Built the backend api"));

    // keyword routing into backend and database domains
    assert!(recycler
        .notes()
        .read(mar_storage::Domain::Backend)
        .contains("Built the backend api"));
    assert!(recycler
        .notes()
        .read(mar_storage::Domain::Database)
        .contains("database schema"));
    // "frontend" appears in the summary, so the frontend domain gets it too
    assert!(recycler
        .notes()
        .read(mar_storage::Domain::Frontend)
        .contains("Frontend not started"));

    // continuation carries objective and pending steps
    assert!(continuation.contains("build a web app"));
    assert!(continuation.contains("- build the ui"));
    assert!(continuation.contains("Do not repeat completed work"));

    // the fresh conversation starts at the continuation's own cost
    assert_eq!(recycler.current_tokens(), count_tokens(&continuation));
    assert!(!recycler.needs_recycle());
}

#[tokio::test]
async fn summary_prompt_asks_for_500_words() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 100);
    let llm = FakeLlm::with_script(vec!["short summary"]);
    recycler
        .recycle(&llm, &objective("x"), &[], &[], TS)
        .await
        .unwrap();
    assert!(llm.prompts()[0].contains("under 500 words"));
}

#[tokio::test]
async fn failed_summary_still_recycles() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 100);
    recycler.observe(500);
    let continuation = recycler
        .recycle(
            &mar_adapters::FailingLlm,
            &objective("keep going"),
            &[],
            &["next".to_string()],
            TS,
        )
        .await
        .unwrap();
    assert!(continuation.contains("summary unavailable"));
    assert!(continuation.contains("- next"));
    assert!(!recycler.needs_recycle());
}

#[tokio::test]
async fn continuation_truncates_domain_notes_to_tail_budget() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 100);
    recycler
        .save_to_domain(mar_storage::Domain::Research, &"r".repeat(10_000), TS)
        .unwrap();
    let llm = FakeLlm::with_script(vec!["summary"]);
    let continuation = recycler
        .recycle(&llm, &objective("x"), &[], &[], TS)
        .await
        .unwrap();
    // the research section is present but clipped to ~3kB
    assert!(continuation.contains("### RESEARCH"));
    assert!(continuation.len() < 6_000);
}

#[test]
fn set_task_resets_tokens_and_seeds_notes() {
    let dir = tempfile::tempdir().unwrap();
    let mut recycler = recycler(&dir, 100);
    recycler.observe(90);
    recycler
        .set_task(&objective("new objective"), &["a".to_string()], TS)
        .unwrap();
    assert_eq!(recycler.current_tokens(), 0);
    assert!(recycler
        .notes()
        .read(mar_storage::Domain::TaskState)
        .contains("new objective"));
}
