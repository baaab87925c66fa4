mod common;

use common::FakeService;
use notetree_core::db::open_db_in_memory;
use notetree_core::{
    ContentService, Credential, DragItem, DropTarget, MoveRejection, NoticeKind, Selection,
    SqliteContentStore, StaticCredential, TreeAction, TreeError, TreeView,
};

fn signed_in() -> StaticCredential {
    StaticCredential::from_token(Some("token-1"))
}

fn loaded_view(service: FakeService) -> TreeView<FakeService, StaticCredential> {
    let mut view = TreeView::new(service, signed_in());
    view.refresh().unwrap();
    view.service().clear_calls();
    view
}

#[test]
fn folder_into_its_descendant_is_rejected_without_a_call() {
    let mut view = loaded_view(FakeService::work_sub());
    let before = view.forest().clone();

    let err = view
        .attempt_move(DragItem::Folder(1), DropTarget::Folder(2))
        .unwrap_err();

    assert!(matches!(
        err,
        TreeError::Rejected(MoveRejection::IntoOwnHierarchy {
            folder_id: 1,
            target_id: 2
        })
    ));
    assert!(view.service().calls().is_empty());
    assert_eq!(view.forest(), &before);
    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Cannot move a folder into its own hierarchy.");
}

#[test]
fn folder_onto_itself_is_rejected() {
    let mut view = loaded_view(FakeService::work_sub());
    let err = view
        .attempt_move(DragItem::Folder(2), DropTarget::Folder(2))
        .unwrap_err();
    assert!(matches!(err, TreeError::Rejected(MoveRejection::IntoItself(2))));
    assert!(view.service().calls().is_empty());
}

#[test]
fn note_onto_its_own_folder_is_a_rejected_no_op() {
    let mut view = loaded_view(FakeService::work_sub());

    let err = view
        .attempt_move(DragItem::Note(10), DropTarget::Folder(2))
        .unwrap_err();
    assert!(matches!(
        err,
        TreeError::Rejected(MoveRejection::AlreadyThere { note_id: 10, .. })
    ));

    let err = view
        .attempt_move(DragItem::Note(11), DropTarget::Root)
        .unwrap_err();
    assert!(matches!(err, TreeError::Rejected(MoveRejection::AlreadyThere { .. })));
    assert!(view.service().calls().is_empty());
}

#[test]
fn accepted_move_mutates_then_rebuilds_from_fresh_read() {
    let mut view = loaded_view(FakeService::work_sub());

    view.attempt_move(DragItem::Folder(2), DropTarget::Root)
        .unwrap();

    assert_eq!(
        view.service().calls(),
        vec!["set_folder_parent 2 None", "list_folders", "list_notes"]
    );
    assert_eq!(view.forest().roots(), &[1, 2]);
    assert_eq!(view.forest().parent_of(2), None);

    view.attempt_move(DragItem::Note(11), DropTarget::Folder(1))
        .unwrap();
    assert_eq!(view.forest().containing_folder(11), Some(1));
    assert!(view.forest().unfiled().is_empty());
}

#[test]
fn failed_mutation_leaves_selection_and_forest_unchanged() {
    let mut view = loaded_view(FakeService::work_sub());
    assert!(view.select_note(10));
    let before = view.forest().clone();
    view.service().fail_mutations.set(true);

    let err = view
        .attempt_move(DragItem::Note(10), DropTarget::Root)
        .unwrap_err();

    assert!(matches!(
        err,
        TreeError::Mutation {
            action: TreeAction::MoveNote,
            ..
        }
    ));
    assert_eq!(view.service().calls(), vec!["set_note_folder 10 None"]);
    assert_eq!(view.forest(), &before);
    assert_eq!(view.selection(), Selection::Note(10));
    assert_eq!(view.notice().unwrap().message, "Failed to move the note.");

    view.dismiss_notice();
    assert!(view.notice().is_none());
}

#[test]
fn drag_over_reports_acceptance_and_drop_consumes_the_drag() {
    let mut view = loaded_view(FakeService::work_sub());

    assert!(!view.drag_over(DropTarget::Root));
    view.drag_start(DragItem::Folder(1));
    assert!(!view.drag_over(DropTarget::Folder(2)));
    assert!(!view.drag_over(DropTarget::Folder(1)));

    view.drag_start(DragItem::Folder(2));
    assert!(view.drag_over(DropTarget::Root));
    view.drop(DropTarget::Root).unwrap();
    assert_eq!(view.dragging(), None);
    assert_eq!(view.forest().roots(), &[1, 2]);

    // Nothing dragged: no call.
    view.service().clear_calls();
    view.drop(DropTarget::Folder(1)).unwrap();
    assert!(view.service().calls().is_empty());
}

#[test]
fn moves_without_credential_block_and_short_circuit() {
    let service = FakeService::work_sub();
    let mut view = TreeView::new(service, StaticCredential::default());

    assert!(matches!(view.refresh(), Err(TreeError::NotAuthenticated)));
    assert!(matches!(
        view.attempt_move(DragItem::Note(10), DropTarget::Root),
        Err(TreeError::NotAuthenticated)
    ));
    assert!(view.service().calls().is_empty());
    assert!(!view.is_authenticated());

    let notice = view.notice().unwrap().clone();
    assert_eq!(notice.kind, NoticeKind::Blocking);
    assert_eq!(notice.message, "User not authenticated. Please log in.");
    view.dismiss_notice();
    assert_eq!(view.notice(), Some(&notice));
}

#[test]
fn rejected_credential_on_mutation_blocks_the_view() {
    let mut view = loaded_view(FakeService::work_sub());
    view.service().reject_credential.set(true);

    let err = view
        .attempt_move(DragItem::Folder(2), DropTarget::Root)
        .unwrap_err();
    assert!(matches!(err, TreeError::NotAuthenticated));
    assert!(!view.is_authenticated());
    assert_eq!(view.notice().unwrap().kind, NoticeKind::Blocking);
}

#[test]
fn sqlite_store_stays_acyclic_over_a_move_sequence() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteContentStore::try_new(&conn).unwrap();
    let credential = Credential::new("local").unwrap();
    store.create_folder(&credential, "A", None).unwrap();
    store.create_folder(&credential, "B", Some(1)).unwrap();
    store.create_folder(&credential, "C", Some(2)).unwrap();
    store.create_folder(&credential, "D", None).unwrap();
    store.create_note(&credential, "n", Some(3)).unwrap();

    let mut view = TreeView::new(store, signed_in());
    view.refresh().unwrap();

    let moves = [
        (DragItem::Folder(1), DropTarget::Folder(3)),
        (DragItem::Folder(4), DropTarget::Folder(3)),
        (DragItem::Folder(1), DropTarget::Folder(4)),
        (DragItem::Folder(2), DropTarget::Root),
        (DragItem::Folder(2), DropTarget::Folder(2)),
        (DragItem::Folder(3), DropTarget::Folder(1)),
        (DragItem::Note(1), DropTarget::Folder(4)),
        (DragItem::Folder(4), DropTarget::Folder(1)),
    ];
    for (item, target) in moves {
        let _ = view.attempt_move(item, target);

        let forest = view.forest();
        assert_eq!(forest.folder_count(), 4);
        for id in forest.folder_ids() {
            let mut cursor = forest.parent_of(id);
            let mut hops = 0;
            while let Some(parent) = cursor {
                assert_ne!(parent, id, "folder {id} is its own ancestor");
                hops += 1;
                assert!(hops <= forest.folder_count());
                cursor = forest.parent_of(parent);
            }
        }
    }

    // A(1) holds C(3) and D(4); B(2) is a root.
    assert_eq!(view.forest().roots(), &[1, 2]);
    assert_eq!(view.forest().parent_of(4), Some(1));
    assert_eq!(view.forest().parent_of(3), Some(1));
    assert_eq!(view.forest().containing_folder(1), Some(4));
}
