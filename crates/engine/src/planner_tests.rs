use super::*;
use mar_adapters::FakeLlm;
use mar_core::FakeClock;

fn objective(text: &str) -> Objective {
    Objective::new(text, &FakeClock::new())
}

#[yare::parameterized(
    business   = { "launch a SaaS platform for invoicing", PlanKind::ComplexBusiness },
    research   = { "research transformer architectures and write a paper", PlanKind::Research },
    simple     = { "create a Python function that adds two numbers", PlanKind::General },
    webapp     = { "build a web app for recipes", PlanKind::ComplexBusiness },
)]
fn objective_classification(text: &str, expected: PlanKind) {
    assert_eq!(classify_objective(text), expected);
}

#[test]
fn parse_accepts_numbered_bulleted_bold_and_bracketed() {
    let response = "\
# The Plan

Phase 1:
1. Create add_numbers.py COMPLETE with the function
2) Create test_add_numbers.py COMPLETE with tests
- Run the tests
* Fix anything broken
**Review the final code**
[COMPONENT] Build the result card

That's everything you need.";
    let steps = parse_steps(response);
    assert_eq!(
        steps,
        vec![
            "Create add_numbers.py COMPLETE with the function",
            "Create test_add_numbers.py COMPLETE with tests",
            "Run the tests",
            "Fix anything broken",
            "Review the final code",
            "[COMPONENT] Build the result card",
        ]
    );
}

#[test]
fn pure_section_headers_are_rejected() {
    let steps = parse_steps("1. Setup:\n2. Implement the whole parser in one pass\n");
    assert_eq!(steps, vec!["Implement the whole parser in one pass"]);
}

#[test]
fn narration_between_items_is_ignored() {
    let steps = parse_steps("Here is the plan.\n1. Do the thing\nHope that helps!\n");
    assert_eq!(steps, vec!["Do the thing"]);
}

#[yare::parameterized(
    qa        = { "write tests for the api", StepCategory::Qa },
    ops       = { "deploy with docker", StepCategory::Ops },
    frontend  = { "build the React component", StepCategory::Frontend },
    backend   = { "create the auth endpoint", StepCategory::Backend },
    academic  = { "draft the paper abstract", StepCategory::Academic },
    research  = { "investigate market trends", StepCategory::Research },
    business  = { "define the pricing strategy", StepCategory::Business },
    deck      = { "outline the pitch deck", StepCategory::Presentation },
    content   = { "write the readme", StepCategory::Content },
    core      = { "refactor the helpers", StepCategory::Core },
)]
fn step_categorization(text: &str, expected: StepCategory) {
    assert_eq!(categorize_step(text), expected);
}

#[tokio::test]
async fn short_plan_triggers_one_retry_with_minimum() {
    let first = "1. Only step";
    let second: String = (1..=12)
        .map(|i| format!("{i}. Step number {i} does real work\n"))
        .collect();
    let llm = FakeLlm::with_script(vec![first, &second]);
    let planner = Planner::new(PlannerConfig::default());

    let steps = planner
        .plan(&llm, &objective("create a Python function"))
        .await
        .unwrap();

    assert_eq!(steps.len(), 12);
    assert_eq!(llm.call_count(), 2);
    let prompts = llm.prompts();
    assert!(prompts[1].contains("minimum of 10 steps"));
}

#[tokio::test]
async fn good_plan_is_not_retried() {
    let response: String = (1..=15)
        .map(|i| format!("{i}. Do useful thing {i}\n"))
        .collect();
    let llm = FakeLlm::with_script(vec![&response]);
    let planner = Planner::new(PlannerConfig::default());
    let steps = planner
        .plan(&llm, &objective("create a Python function"))
        .await
        .unwrap();
    assert_eq!(steps.len(), 15);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn empty_plans_after_retry_are_an_error() {
    let llm = FakeLlm::with_script(vec!["no list here", "still no list"]);
    let planner = Planner::new(PlannerConfig::default());
    let result = planner.plan(&llm, &objective("do something")).await;
    assert!(matches!(result, Err(EngineError::PlannerEmpty)));
}

#[tokio::test]
async fn short_but_nonempty_retry_result_is_accepted() {
    // both attempts short; keep the better of the two
    let llm = FakeLlm::with_script(vec!["1. Step A", "1. Step A\n2. Step B"]);
    let planner = Planner::new(PlannerConfig::default());
    let steps = planner
        .plan(&llm, &objective("small task"))
        .await
        .unwrap();
    assert_eq!(steps.len(), 2);
}

#[tokio::test]
async fn complex_objectives_demand_forty_steps_on_retry() {
    let llm = FakeLlm::with_script(vec!["1. Lone step", "1. Lone step"]);
    let planner = Planner::new(PlannerConfig::default());
    let _ = planner
        .plan(&llm, &objective("launch a SaaS business platform"))
        .await
        .unwrap();
    assert!(llm.prompts()[1].contains("minimum of 40 steps"));
}
