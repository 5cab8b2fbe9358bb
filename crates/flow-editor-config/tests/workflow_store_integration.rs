// Integration tests for the workflow repository.
//
// These exercise the store the way the editor uses it: load a workflow,
// edit it in a history session and write it back.

use flow_editor_config::WorkflowStore;
use flow_editor_mod_history::{EditorHistoryStore, EditorSeed};
use flow_editor_model::{BlockInstance, Position, Wire, Workflow};

fn echo_workflow() -> Workflow {
    Workflow {
        group_id: "chat".to_string(),
        workflow_id: "echo".to_string(),
        name: "Echo".to_string(),
        description: "Replies with the incoming message".to_string(),
        blocks: vec![
            BlockInstance::new("in", "im_input", "Input", Position::new(0.0, 0.0)),
            BlockInstance::new("out", "im_reply", "Reply", Position::new(240.0, 0.0)),
        ],
        wires: vec![Wire::new("in", "msg", "out", "msg")],
        metadata: None,
    }
}

#[test]
fn test_edit_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let repo = WorkflowStore::open(dir.path()).unwrap();
    repo.create(&echo_workflow()).unwrap();

    let stored = repo.get("chat", "echo").unwrap().unwrap();
    let mut session = EditorHistoryStore::default();
    session.initialize(EditorSeed::from_document(stored.to_document(), Vec::new()));
    assert!(!session.is_dirty());

    session.remove_block("out");
    session.rename("Sink");
    assert!(session.is_dirty());

    let edited = Workflow::from_document("chat", session.document().clone());
    repo.update(&edited).unwrap();

    let reloaded = repo.get("chat", "echo").unwrap().unwrap();
    assert_eq!(reloaded.name, "Sink");
    assert_eq!(reloaded.blocks.len(), 1);
    assert!(reloaded.wires.is_empty());
}

#[test]
fn test_many_workflows_across_groups() {
    let dir = tempfile::tempdir().unwrap();
    let repo = WorkflowStore::open(dir.path()).unwrap();

    for group in ["chat", "ops"] {
        for i in 0..5 {
            let mut workflow = echo_workflow();
            workflow.group_id = group.to_string();
            workflow.workflow_id = format!("wf-{i}");
            repo.create(&workflow).unwrap();
        }
    }

    let listing = repo.list().unwrap();
    assert_eq!(listing.len(), 10);
    assert!(listing.iter().all(|l| l.info.block_count == 2));
    assert_eq!(
        listing.iter().filter(|l| l.info.group_id == "ops").count(),
        5
    );
}

#[test]
fn test_listing_timestamps_advance_on_update() {
    let dir = tempfile::tempdir().unwrap();
    let repo = WorkflowStore::open(dir.path()).unwrap();
    repo.create(&echo_workflow()).unwrap();
    let first = repo.list().unwrap()[0].updated_at;

    std::thread::sleep(std::time::Duration::from_millis(5));
    repo.update(&echo_workflow()).unwrap();
    let second = repo.list().unwrap()[0].updated_at;
    assert!(second > first);
}

#[test]
fn test_database_reopen_preserves_workflows() {
    let dir = tempfile::tempdir().unwrap();
    {
        let repo = WorkflowStore::open(dir.path()).unwrap();
        repo.create(&echo_workflow()).unwrap();
    }

    let repo = WorkflowStore::open(dir.path()).unwrap();
    assert_eq!(repo.get("chat", "echo").unwrap(), Some(echo_workflow()));
}

#[test]
fn test_open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let repo = WorkflowStore::open(&nested).unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert!(WorkflowStore::database_path(&nested).exists());
}
