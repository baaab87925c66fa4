use notetree_core::feed::{sort_feed, UserId, UNKNOWN_AUTHOR};
use notetree_core::{
    ContentError, Credential, Feed, FeedApi, FeedError, FeedNote, FeedSort, NoteId, Reaction,
    StaticCredential,
};
use serde_json::json;
use std::cell::{Cell, RefCell};

#[derive(Default)]
struct FakeFeed {
    notes: Vec<FeedNote>,
    reactions: RefCell<Vec<(NoteId, Reaction)>>,
    fail_react: Cell<bool>,
}

impl FeedApi for FakeFeed {
    fn feed(&self, _credential: &Credential, search: &str) -> Result<Vec<FeedNote>, ContentError> {
        Ok(self
            .notes
            .iter()
            .filter(|note| note.heading.contains(search))
            .cloned()
            .collect())
    }

    fn username(&self, _credential: &Credential, user_id: UserId) -> Result<String, ContentError> {
        match user_id {
            1 => Ok("ana".to_string()),
            _ => Err(ContentError::NotFound(format!("user {user_id}"))),
        }
    }

    fn react(
        &self,
        _credential: &Credential,
        note_id: NoteId,
        reaction: Reaction,
    ) -> Result<(), ContentError> {
        if self.fail_react.get() {
            return Err(ContentError::Transport("offline".to_string()));
        }
        self.reactions.borrow_mut().push((note_id, reaction));
        Ok(())
    }
}

fn note(id: NoteId, heading: &str, likes: i64, dislikes: i64, created_at: &str) -> FeedNote {
    let user_id: UserId = if id == 1 { 1 } else { 2 };
    serde_json::from_value(json!({
        "id": id,
        "heading": heading,
        "body": {"type": "doc", "content": [{"type": "text", "text": heading}]},
        "likesCount": likes,
        "dislikesCount": dislikes,
        "createdAt": created_at,
        "isLiked": false,
        "isDisliked": false,
        "userId": user_id,
    }))
    .unwrap()
}

fn sample() -> Vec<FeedNote> {
    vec![
        note(1, "alpha", 3, 0, "2024-03-01T10:00:00Z"),
        note(2, "beta", 5, 4, "2024-05-01T10:00:00"),
        note(3, "gamma", 0, 0, "not a date"),
    ]
}

fn loaded_feed(api: FakeFeed) -> Feed<FakeFeed, StaticCredential> {
    let mut feed = Feed::new(api, StaticCredential::from_token(Some("token")));
    feed.load("").unwrap();
    feed
}

fn find(feed: &Feed<FakeFeed, StaticCredential>, id: NoteId) -> FeedNote {
    feed.notes().into_iter().find(|note| note.id == id).unwrap()
}

#[test]
fn load_resolves_usernames_with_fallback() {
    let feed = loaded_feed(FakeFeed {
        notes: sample(),
        ..FakeFeed::default()
    });
    assert_eq!(find(&feed, 1).username.as_deref(), Some("ana"));
    assert_eq!(find(&feed, 2).username.as_deref(), Some(UNKNOWN_AUTHOR));
    assert!(feed.error().is_none());
}

#[test]
fn search_is_passed_through() {
    let mut feed = Feed::new(
        FakeFeed {
            notes: sample(),
            ..FakeFeed::default()
        },
        StaticCredential::from_token(Some("token")),
    );
    feed.load(" beta ").unwrap();
    let notes = feed.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, 2);
}

#[test]
fn like_twice_undoes_and_dislike_moves_the_reaction() {
    let mut feed = loaded_feed(FakeFeed {
        notes: sample(),
        ..FakeFeed::default()
    });

    feed.like(1).unwrap();
    let liked = find(&feed, 1);
    assert!(liked.is_liked);
    assert_eq!(liked.likes_count, 4);

    feed.dislike(1).unwrap();
    let disliked = find(&feed, 1);
    assert!(!disliked.is_liked);
    assert!(disliked.is_disliked);
    assert_eq!(disliked.likes_count, 3);
    assert_eq!(disliked.dislikes_count, 1);

    feed.dislike(1).unwrap();
    let cleared = find(&feed, 1);
    assert!(!cleared.is_liked && !cleared.is_disliked);
    assert_eq!((cleared.likes_count, cleared.dislikes_count), (3, 0));

    assert_eq!(feed.api().reactions.borrow().len(), 3);
}

#[test]
fn failed_reaction_changes_no_counter() {
    let mut feed = loaded_feed(FakeFeed {
        notes: sample(),
        fail_react: Cell::new(true),
        ..FakeFeed::default()
    });

    let err = feed.like(2).unwrap_err();
    assert!(matches!(
        err,
        FeedError::React {
            reaction: Reaction::Like,
            ..
        }
    ));
    let unchanged = find(&feed, 2);
    assert!(!unchanged.is_liked);
    assert_eq!(unchanged.likes_count, 5);
    assert_eq!(feed.error(), Some("Error updating the like status."));
}

#[test]
fn reacting_to_unloaded_note_is_refused() {
    let mut feed = loaded_feed(FakeFeed {
        notes: sample(),
        ..FakeFeed::default()
    });
    assert!(matches!(feed.like(99), Err(FeedError::NoteNotLoaded(99))));
    assert!(feed.api().reactions.borrow().is_empty());
}

#[test]
fn missing_credential_is_reported() {
    let mut feed = Feed::new(FakeFeed::default(), StaticCredential::default());
    assert!(matches!(feed.load(""), Err(FeedError::NotAuthenticated)));
    assert_eq!(feed.error(), Some("User not authenticated. Please log in."));
}

#[test]
fn sort_orders() {
    let ids = |notes: &[FeedNote]| notes.iter().map(|note| note.id).collect::<Vec<_>>();

    let mut notes = sample();
    sort_feed(&mut notes, FeedSort::MostRecent);
    assert_eq!(ids(&notes), vec![2, 1, 3]);

    sort_feed(&mut notes, FeedSort::LeastRecent);
    assert_eq!(ids(&notes), vec![1, 2, 3]);

    // Net likes: alpha 3, beta 1, gamma 0.
    sort_feed(&mut notes, FeedSort::MostLikes);
    assert_eq!(ids(&notes), vec![1, 2, 3]);

    sort_feed(&mut notes, FeedSort::LeastLikes);
    assert_eq!(ids(&notes), vec![3, 2, 1]);
}

#[test]
fn feed_view_applies_chosen_sort() {
    let mut feed = loaded_feed(FakeFeed {
        notes: sample(),
        ..FakeFeed::default()
    });
    assert_eq!(feed.sort(), FeedSort::MostRecent);
    assert_eq!(feed.notes()[0].id, 2);

    feed.set_sort(FeedSort::LeastLikes);
    assert_eq!(feed.notes()[0].id, 3);
    assert_eq!(find(&feed, 1).preview(10).as_deref(), Some("alpha"));
}
