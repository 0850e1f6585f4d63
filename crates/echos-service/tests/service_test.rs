use std::sync::Arc;
use std::thread;

use uuid::Uuid;

use echos_service::{ContentService, StoreError};
use echos_store::Database;
use echos_types::api::Caller;
use echos_types::models::{ImportanceLevel, LikeState, Role, User};

fn setup() -> (Arc<Database>, ContentService) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let service = ContentService::new(db.clone());
    (db, service)
}

fn provision(db: &Database, email: &str, role: Role) -> Caller {
    let user = db.create_user(email, role).unwrap();
    caller_of(&user)
}

fn caller_of(user: &User) -> Caller {
    Caller {
        id: user.id,
        role: user.role,
        email: user.email.clone(),
    }
}

#[test]
fn member_creates_and_lists_posts() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    let posts = service.list_posts().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post.id, post.id);
    assert_eq!(posts[0].author.as_ref().unwrap().id, alice.id);
    assert_eq!(posts[0].like_count, 0);

    assert!(matches!(
        service.create_post(&alice, "", "body", &[], false, None),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn like_toggle_alternates_and_updates_count() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let bob = provision(&db, "bob@example.com", Role::Member);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    assert_eq!(
        service.toggle_like(&bob, post.id).unwrap(),
        Some(LikeState::Added)
    );
    assert!(service.has_liked(&bob, post.id).unwrap());
    assert_eq!(service.list_posts().unwrap()[0].like_count, 1);

    assert_eq!(
        service.toggle_like(&bob, post.id).unwrap(),
        Some(LikeState::Removed)
    );
    assert!(!service.has_liked(&bob, post.id).unwrap());
    assert_eq!(service.list_posts().unwrap()[0].like_count, 0);

    // 2n toggles restore the initial state
    for _ in 0..4 {
        service.toggle_like(&bob, post.id).unwrap();
    }
    assert!(!service.has_liked(&bob, post.id).unwrap());

    assert_eq!(service.toggle_like(&bob, Uuid::new_v4()).unwrap(), None);
}

#[test]
fn non_owner_mutations_are_refused_without_existence_leak() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let mallory = provision(&db, "mallory@example.com", Role::Member);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    // foreign post and missing post are indistinguishable to the caller
    assert!(!service.update_post(&mallory, post.id, "t", "c").unwrap());
    assert!(!service.update_post(&mallory, Uuid::new_v4(), "t", "c").unwrap());
    assert!(!service.delete_post(&mallory, post.id).unwrap());
    assert!(!service.delete_post(&mallory, Uuid::new_v4()).unwrap());

    let detail = service.get_post(post.id).unwrap().unwrap();
    assert_eq!(detail.post.title, "Hello");
    assert!(detail.post.updated_at.is_none());
}

#[test]
fn owner_updates_own_post() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    assert!(service.update_post(&alice, post.id, "Edited", "Body").unwrap());
    let detail = service.get_post(post.id).unwrap().unwrap();
    assert_eq!(detail.post.title, "Edited");
    assert!(detail.post.updated_at.is_some());
}

#[test]
fn admin_deletes_foreign_post() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let admin = provision(&db, "ops@example.com", Role::Admin);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    assert!(service.delete_post(&admin, post.id).unwrap());
    assert!(service.get_post(post.id).unwrap().is_none());
}

#[test]
fn post_delete_cascades_all_engagement() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let bob = provision(&db, "bob@example.com", Role::Member);
    let tag = service.list_tags().unwrap().remove(0);

    let post = service
        .create_post(&alice, "Hello", "First post", &[tag.id], false, None)
        .unwrap();
    service.toggle_like(&bob, post.id).unwrap();
    service.add_comment(&bob, post.id, "Nice one").unwrap().unwrap();

    assert!(service.delete_post(&alice, post.id).unwrap());

    assert!(service.get_post(post.id).unwrap().is_none());
    assert!(!service.has_liked(&bob, post.id).unwrap());
    // commenting on the deleted post reports absence, not an error
    assert!(service.add_comment(&bob, post.id, "ghost").unwrap().is_none());
    // the tag vocabulary is untouched
    assert!(service.get_tag(tag.id).unwrap().is_some());
}

#[test]
fn comments_are_deletable_by_author_and_admin_only() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let bob = provision(&db, "bob@example.com", Role::Member);
    let admin = provision(&db, "ops@example.com", Role::Admin);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();
    let first = service.add_comment(&bob, post.id, "first").unwrap().unwrap();
    let second = service.add_comment(&bob, post.id, "second").unwrap().unwrap();

    // the post author does not own the comment
    assert!(!service.delete_comment(&alice, first.id).unwrap());
    assert!(service.delete_comment(&bob, first.id).unwrap());
    assert!(service.delete_comment(&admin, second.id).unwrap());

    let detail = service.get_post(post.id).unwrap().unwrap();
    assert!(detail.comments.is_empty());

    assert!(matches!(
        service.add_comment(&bob, post.id, "   "),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn admin_accounts_are_protected() {
    let (db, service) = setup();
    let admin = provision(&db, "ops@example.com", Role::Admin);
    let other_admin = provision(&db, "root@example.com", Role::Admin);
    let member = provision(&db, "bob@example.com", Role::Member);

    // no path promotes to admin
    assert!(!service
        .change_user_role(&admin, member.id, Role::Admin)
        .unwrap());
    // admin targets are exempt from role changes and deletion
    assert!(!service
        .change_user_role(&admin, other_admin.id, Role::Member)
        .unwrap());
    assert!(!service.delete_user(&admin, other_admin.id).unwrap());

    let users = service.list_users(&admin).unwrap();
    let target = users.iter().find(|u| u.id == other_admin.id).unwrap();
    assert_eq!(target.role, Role::Admin);
    let target = users.iter().find(|u| u.id == member.id).unwrap();
    assert_eq!(target.role, Role::Member);

    // legitimate promotion below the protected tier works
    assert!(service
        .change_user_role(&admin, member.id, Role::Leader)
        .unwrap());
}

#[test]
fn admin_surface_requires_admin_caller() {
    let (db, service) = setup();
    let leader = provision(&db, "lead@example.com", Role::Leader);
    let member = provision(&db, "bob@example.com", Role::Member);

    assert!(service.list_users(&leader).unwrap().is_empty());
    assert!(!service
        .change_user_role(&leader, member.id, Role::Leader)
        .unwrap());
    assert!(!service.delete_user(&leader, member.id).unwrap());
    assert!(service
        .create_user(&member, "eve@example.com", Role::Member)
        .unwrap()
        .is_none());
    assert!(service.create_tag(&leader, "Ops", "#336699").unwrap().is_none());
}

#[test]
fn deleted_user_orphans_their_engagement() {
    let (db, service) = setup();
    let admin = provision(&db, "ops@example.com", Role::Admin);
    let alice = provision(&db, "alice@example.com", Role::Member);
    let bob = provision(&db, "bob@example.com", Role::Member);

    let alices_post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();
    let bobs_post = service
        .create_post(&bob, "Mine", "Bob's post", &[], false, None)
        .unwrap();
    service.toggle_like(&bob, alices_post.id).unwrap();
    service.add_comment(&bob, alices_post.id, "Nice").unwrap().unwrap();

    assert!(service.delete_user(&admin, bob.id).unwrap());

    // Bob's own post cascaded away with him
    assert!(service.get_post(bobs_post.id).unwrap().is_none());

    // but his engagement on Alice's post survives as orphaned rows,
    // rendered with a missing user rather than an error
    let detail = service.get_post(alices_post.id).unwrap().unwrap();
    assert_eq!(detail.likes.len(), 1);
    assert!(detail.likes[0].user.is_none());
    assert_eq!(detail.comments.len(), 1);
    assert!(detail.comments[0].author.is_none());
    assert_eq!(detail.comments[0].comment.content, "Nice");
}

#[test]
fn member_triage_fields_are_silently_dropped() {
    let (db, service) = setup();
    let member = provision(&db, "bob@example.com", Role::Member);
    let leader = provision(&db, "lead@example.com", Role::Leader);

    let post = service
        .create_post(
            &member,
            "Hello",
            "Body",
            &[],
            true,
            Some(ImportanceLevel::High),
        )
        .unwrap();
    assert!(!post.is_read);
    assert!(post.importance.is_none());

    // a Member review attempt is the permissive no-op
    assert!(!service
        .review_post(&member, post.id, true, Some(ImportanceLevel::High))
        .unwrap());
    let detail = service.get_post(post.id).unwrap().unwrap();
    assert!(!detail.post.is_read);

    // Leaders hold the triage pen
    assert!(service
        .review_post(&leader, post.id, true, Some(ImportanceLevel::Medium))
        .unwrap());
    let detail = service.get_post(post.id).unwrap().unwrap();
    assert!(detail.post.is_read);
    assert_eq!(detail.post.importance, Some(ImportanceLevel::Medium));

    let leaders_post = service
        .create_post(
            &leader,
            "Triaged",
            "Body",
            &[],
            true,
            Some(ImportanceLevel::Low),
        )
        .unwrap();
    assert!(leaders_post.is_read);
    assert_eq!(leaders_post.importance, Some(ImportanceLevel::Low));
}

#[test]
fn concurrent_toggles_never_double_like() {
    let (db, service) = setup();
    let alice = provision(&db, "alice@example.com", Role::Member);
    let bob = provision(&db, "bob@example.com", Role::Member);

    let post = service
        .create_post(&alice, "Hello", "First post", &[], false, None)
        .unwrap();

    let service = Arc::new(service);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = service.clone();
        let bob = bob.clone();
        let post_id = post.id;
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                service.toggle_like(&bob, post_id).unwrap().unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // 100 toggles in total: back to the initial state, and never more
    // than one row for the pair along the way
    let detail = service.get_post(post.id).unwrap().unwrap();
    assert!(detail.likes.is_empty());
    assert!(!service.has_liked(&bob, post.id).unwrap());
}
