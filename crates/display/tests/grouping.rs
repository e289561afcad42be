use serde_json::json;
use tracelens_core::testing;
use tracelens_core::TranscriptEvent;
use tracelens_display::{group, DisplayItem, TaskId, TaskStatus, ToolCardTag};

fn internal(id: &str) -> TranscriptEvent {
    testing::assistant(
        id,
        vec![
            testing::thinking("considering"),
            testing::tool_call(&format!("{id}-call"), "Read", json!({"file_path": "/tmp/a"})),
        ],
    )
}

fn task_create(id: &str, call_id: &str, subject: &str) -> TranscriptEvent {
    testing::assistant(
        id,
        vec![testing::tool_call(call_id, "TaskCreate", json!({"subject": subject}))],
    )
}

fn task_update(id: &str, task_id: &str, status: &str) -> TranscriptEvent {
    testing::assistant(
        id,
        vec![testing::tool_call(
            &format!("{id}-call"),
            "TaskUpdate",
            json!({"taskId": task_id, "status": status}),
        )],
    )
}

#[test]
fn grouping_is_pure() {
    let events = vec![
        testing::user_text("u1", "hello"),
        internal("a1"),
        internal("a2"),
        testing::assistant("a3", vec![testing::text_unit("done")]),
        testing::turn_marker("s1", 900),
    ];

    assert_eq!(group(&events), group(&events));
}

#[test]
fn member_events_reconstruct_the_input() {
    let events = vec![
        testing::user_text("u1", "start"),
        internal("a1"),
        testing::tool_results("u2", &[("a1-call", "contents", false)]),
        task_create("a2", "c-create", "Write tests"),
        testing::tool_results("u3", &[("c-create", "Task #7 created", false)]),
        task_update("a3", "7", "completed"),
        internal("a4"),
        testing::assistant("a5", vec![testing::text_unit("summary")]),
        testing::turn_marker("s1", 1200),
    ];

    let items = group(&events);
    let reconstructed: Vec<&str> = items
        .iter()
        .flat_map(|item| item.member_events())
        .map(|event| event.id.as_str())
        .collect();
    let original: Vec<&str> = events.iter().map(|event| event.id.as_str()).collect();
    assert_eq!(reconstructed, original);
}

#[test]
fn user_text_always_starts_a_new_item() {
    let events = vec![
        internal("a1"),
        testing::user_text("u1", "interrupting"),
        internal("a2"),
    ];

    let items = group(&events);
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], DisplayItem::ActivityRun { .. }));
    assert!(matches!(items[1], DisplayItem::User { .. }));
    assert!(matches!(items[2], DisplayItem::ActivityRun { .. }));
}

#[test]
fn consecutive_internal_events_collapse_into_one_run() {
    let events = vec![
        testing::assistant_with_usage("a1", vec![testing::thinking("t")], 100, 20),
        testing::assistant_with_usage(
            "a2",
            vec![testing::tool_call("c1", "Grep", json!({"pattern": "fn"}))],
            200,
            30,
        ),
        testing::assistant_with_usage(
            "a3",
            vec![
                testing::tool_call("c2", "Read", json!({})),
                testing::tool_call("c3", "Read", json!({})),
            ],
            0,
            50,
        ),
        testing::user_text("u1", "next"),
    ];

    let items = group(&events);
    match &items[0] {
        DisplayItem::ActivityRun { steps, tokens, events } => {
            assert_eq!(events.len(), 3);
            assert_eq!(
                steps,
                &["Thinking", "Grep", "Read", "Read"]
                    .map(String::from)
                    .to_vec()
            );
            assert!(steps.len() >= events.len());
            assert_eq!(*tokens, 100 + 20 + 200 + 30 + 50);
        }
        other => panic!("expected activity run, got {other:?}"),
    }
}

#[test]
fn classification_priority_text_wins_over_tool_call() {
    let events = vec![testing::assistant(
        "a1",
        vec![
            testing::text_unit("I ran it"),
            testing::tool_call("c1", "Bash", json!({"command": "ls"})),
        ],
    )];

    let items = group(&events);
    assert!(matches!(items[0], DisplayItem::Assistant { .. }));
}

#[test]
fn recognized_tools_become_standalone_cards() {
    let events = vec![
        testing::assistant(
            "a1",
            vec![testing::tool_call("c1", "AskUserQuestion", json!({}))],
        ),
        testing::assistant("a2", vec![testing::tool_call("c2", "ExitPlanMode", json!({}))]),
        testing::assistant(
            "a3",
            vec![testing::tool_call("c3", "Bash", json!({"command": "ls"}))],
        ),
        testing::assistant("a4", vec![testing::tool_call("c4", "Task", json!({}))]),
        testing::assistant("a5", vec![testing::tool_call("c5", "Agent", json!({}))]),
    ];

    let items = group(&events);
    assert!(matches!(
        items[0],
        DisplayItem::ToolCard { tag: ToolCardTag::AskQuestion, .. }
    ));
    assert!(matches!(
        items[1],
        DisplayItem::ToolCard { tag: ToolCardTag::ExitPlan, .. }
    ));
    assert!(matches!(
        items[2],
        DisplayItem::ToolCard { tag: ToolCardTag::Bash, .. }
    ));
    assert!(matches!(items[3], DisplayItem::AgentCall { .. }));
    assert!(matches!(items[4], DisplayItem::AgentCall { .. }));
}

#[test]
fn bash_card_outranks_task_call_in_same_event() {
    let events = vec![testing::assistant(
        "a1",
        vec![
            testing::tool_call("c1", "Bash", json!({"command": "ls"})),
            testing::tool_call("c2", "Task", json!({})),
        ],
    )];

    let items = group(&events);
    assert!(matches!(
        items[0],
        DisplayItem::ToolCard { tag: ToolCardTag::Bash, .. }
    ));
}

#[test]
fn activity_flushes_before_tasks() {
    // Both runs pending when the user speaks: the activity run must close
    // first, then the task board, then the user item.
    let events = vec![
        task_create("a1", "c1", "subject"),
        internal("a2"),
        testing::user_text("u1", "next"),
    ];

    let items = group(&events);
    // a1 opens the task run; a2 closes it (internal flushes tasks), so here
    // the order is board, run, user.
    assert!(matches!(items[0], DisplayItem::TaskBoard { .. }));
    assert!(matches!(items[1], DisplayItem::ActivityRun { .. }));
    assert!(matches!(items[2], DisplayItem::User { .. }));

    // The direct case: activity pending, then tasks, then flush.
    let events = vec![
        internal("a1"),
        testing::assistant("a2", vec![testing::text_unit("hi")]),
        internal("a3"),
        task_create("a4", "c1", "subject"),
        testing::user_text("u1", "next"),
    ];
    let items = group(&events);
    assert!(matches!(items[0], DisplayItem::ActivityRun { .. }));
    assert!(matches!(items[1], DisplayItem::Assistant { .. }));
    assert!(matches!(items[2], DisplayItem::ActivityRun { .. }));
    assert!(matches!(items[3], DisplayItem::TaskBoard { .. }));
    assert!(matches!(items[4], DisplayItem::User { .. }));
}

#[test]
fn turn_marker_flushes_and_carries_duration() {
    let events = vec![internal("a1"), testing::turn_marker("s1", 4200)];

    let items = group(&events);
    assert!(matches!(items[0], DisplayItem::ActivityRun { .. }));
    match items[1] {
        DisplayItem::TurnMarker { duration_ms, .. } => assert_eq!(duration_ms, 4200),
        _ => panic!("expected turn marker"),
    }
}

#[test]
fn task_snapshots_show_status_at_flush_time() {
    let events = vec![
        task_create("a1", "c-create", "Write tests"),
        testing::tool_results("u1", &[("c-create", "Task #7 created", false)]),
        testing::user_text("u2", "how is it going?"),
        task_update("a2", "7", "completed"),
        testing::user_text("u3", "thanks"),
    ];

    let items = group(&events);
    let boards: Vec<_> = items
        .iter()
        .filter_map(|item| match item {
            DisplayItem::TaskBoard { tasks, .. } => Some(tasks),
            _ => None,
        })
        .collect();
    assert_eq!(boards.len(), 2);

    let seven = TaskId::new("7");
    assert_eq!(boards[0][&seven].status, TaskStatus::Pending);
    assert_eq!(boards[0][&seven].subject, "Write tests");
    assert_eq!(boards[1][&seven].status, TaskStatus::Completed);
    // The update mutated tracker state, not the earlier snapshot.
    assert_eq!(boards[0][&seven].status, TaskStatus::Pending);
}

#[test]
fn task_result_events_stay_with_the_open_task_run() {
    let events = vec![
        task_create("a1", "c1", "first"),
        testing::tool_results("u1", &[("c1", "Task #1 created", false)]),
        task_update("a2", "1", "in_progress"),
        testing::user_text("u2", "ok"),
    ];

    let items = group(&events);
    match &items[0] {
        DisplayItem::TaskBoard { events, .. } => {
            let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["a1", "u1", "a2"]);
        }
        other => panic!("expected task board, got {other:?}"),
    }
}

#[test]
fn empty_input_produces_empty_plan() {
    assert!(group(&[]).is_empty());
}

#[test]
fn malformed_task_input_never_drops_the_item() {
    let events = vec![
        testing::assistant(
            "a1",
            vec![testing::tool_call("c1", "TaskCreate", json!("not an object"))],
        ),
        testing::user_text("u1", "next"),
    ];

    let items = group(&events);
    match &items[0] {
        DisplayItem::TaskBoard { tasks, events } => {
            assert_eq!(events.len(), 1);
            // The create's id falls back to the call id; subject degrades to
            // empty.
            assert_eq!(tasks[&TaskId::new("c1")].subject, "");
        }
        other => panic!("expected task board, got {other:?}"),
    }
}
