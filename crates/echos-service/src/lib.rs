//! Caller-identity-aware operation layer over the content store.
//!
//! Every mutation passes through a policy check here before touching the
//! store; the store never re-checks policy, and this layer never touches
//! SQL. Absence and refusal are surfaced identically (`false`/`None`) on
//! update/delete paths so non-owners cannot probe for existence.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use echos_store::{Database, NewPost, Result};
use echos_types::api::Caller;
use echos_types::models::{
    Comment, ImportanceLevel, LikeState, Post, PostDetail, PostSummary, Role, Tag, User,
};

pub use echos_store::StoreError;

#[derive(Clone)]
pub struct ContentService {
    store: Arc<Database>,
}

impl ContentService {
    pub fn new(store: Arc<Database>) -> Self {
        Self { store }
    }

    // -- Posts --

    /// Create a post authored by the caller. The Leader-only triage
    /// fields are honored for Leader/Admin callers and silently reset to
    /// defaults for Members (permissive policy: the request still
    /// succeeds).
    pub fn create_post(
        &self,
        caller: &Caller,
        title: &str,
        content: &str,
        tag_ids: &[Uuid],
        is_read: bool,
        importance: Option<ImportanceLevel>,
    ) -> Result<Post> {
        let (is_read, importance) = if caller.role >= Role::Leader {
            (is_read, importance)
        } else {
            if is_read || importance.is_some() {
                debug!(
                    "Member {} supplied triage fields on create; dropping to defaults",
                    caller.id
                );
            }
            (false, None)
        };

        let post = self.store.create_post(NewPost {
            title,
            content,
            author_id: caller.id,
            tag_ids,
            is_read,
            importance,
        })?;

        info!("Created post {} by user {}", post.id, caller.id);
        Ok(post)
    }

    pub fn get_post(&self, post_id: Uuid) -> Result<Option<PostDetail>> {
        self.store.find_post(post_id)
    }

    pub fn list_posts(&self) -> Result<Vec<PostSummary>> {
        self.store.list_posts()
    }

    /// Authors only. Missing post and foreign post both come back `false`.
    pub fn update_post(
        &self,
        caller: &Caller,
        post_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<bool> {
        let Some(detail) = self.store.find_post(post_id)? else {
            warn!("Post {} not found", post_id);
            return Ok(false);
        };

        if detail.post.author_id != caller.id {
            warn!(
                "User {} attempted to update post {} owned by {}",
                caller.id, post_id, detail.post.author_id
            );
            return Ok(false);
        }

        let updated = self.store.update_post(post_id, title, content)?;
        if updated {
            info!("Updated post {}", post_id);
        }
        Ok(updated)
    }

    /// Authors may delete their own posts; Admins may delete any post.
    pub fn delete_post(&self, caller: &Caller, post_id: Uuid) -> Result<bool> {
        let Some(detail) = self.store.find_post(post_id)? else {
            warn!("Post {} not found", post_id);
            return Ok(false);
        };

        if detail.post.author_id != caller.id && caller.role != Role::Admin {
            warn!(
                "User {} attempted to delete post {} owned by {}",
                caller.id, post_id, detail.post.author_id
            );
            return Ok(false);
        }

        let deleted = self.store.delete_post(post_id)?;
        if deleted {
            info!("Deleted post {} (caller {})", post_id, caller.id);
        }
        Ok(deleted)
    }

    /// Leader/Admin triage flags; a Member call is the documented
    /// permissive no-op.
    pub fn review_post(
        &self,
        caller: &Caller,
        post_id: Uuid,
        is_read: bool,
        importance: Option<ImportanceLevel>,
    ) -> Result<bool> {
        if caller.role < Role::Leader {
            debug!(
                "Member {} attempted to set triage fields on post {}; ignoring",
                caller.id, post_id
            );
            return Ok(false);
        }

        let updated = self.store.set_post_review(post_id, is_read, importance)?;
        if updated {
            info!("Reviewed post {} (caller {})", post_id, caller.id);
        }
        Ok(updated)
    }

    // -- Likes --

    /// Flip the caller's like on a post. `None` means the post is gone.
    pub fn toggle_like(&self, caller: &Caller, post_id: Uuid) -> Result<Option<LikeState>> {
        let state = self.store.toggle_like(post_id, caller.id)?;

        match state {
            Some(LikeState::Added) => info!("User {} liked post {}", caller.id, post_id),
            Some(LikeState::Removed) => info!("User {} unliked post {}", caller.id, post_id),
            None => warn!("User {} toggled like on missing post {}", caller.id, post_id),
        }
        Ok(state)
    }

    pub fn has_liked(&self, caller: &Caller, post_id: Uuid) -> Result<bool> {
        self.store.has_liked(post_id, caller.id)
    }

    // -- Comments --

    /// `None` means the post is gone.
    pub fn add_comment(
        &self,
        caller: &Caller,
        post_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>> {
        let comment = self.store.create_comment(post_id, caller.id, content)?;

        match &comment {
            Some(c) => info!("User {} commented {} on post {}", caller.id, c.id, post_id),
            None => warn!("User {} commented on missing post {}", caller.id, post_id),
        }
        Ok(comment)
    }

    /// Comment authors and Admins only; collapsed `false` otherwise.
    pub fn delete_comment(&self, caller: &Caller, comment_id: Uuid) -> Result<bool> {
        let Some(comment) = self.store.find_comment(comment_id)? else {
            warn!("Comment {} not found", comment_id);
            return Ok(false);
        };

        if comment.author_id != caller.id && caller.role != Role::Admin {
            warn!(
                "User {} attempted to delete comment {} owned by {}",
                caller.id, comment_id, comment.author_id
            );
            return Ok(false);
        }

        let deleted = self.store.delete_comment(comment_id)?;
        if deleted {
            info!("Deleted comment {} (caller {})", comment_id, caller.id);
        }
        Ok(deleted)
    }

    // -- Users (admin surface) --

    /// Provision a user row. Admin callers only.
    pub fn create_user(&self, caller: &Caller, email: &str, role: Role) -> Result<Option<User>> {
        if caller.role != Role::Admin {
            warn!("User {} attempted to provision an account", caller.id);
            return Ok(None);
        }

        let user = self.store.create_user(email, role)?;
        info!("Provisioned user {} with role {}", user.id, user.role);
        Ok(Some(user))
    }

    pub fn list_users(&self, caller: &Caller) -> Result<Vec<User>> {
        if caller.role != Role::Admin {
            warn!("User {} attempted to list users", caller.id);
            return Ok(Vec::new());
        }
        self.store.list_users()
    }

    /// Admin callers only, and never *to* Admin: there is no self-service
    /// path into the protected tier. Admin targets are themselves exempt.
    pub fn change_user_role(
        &self,
        caller: &Caller,
        target_id: Uuid,
        new_role: Role,
    ) -> Result<bool> {
        if caller.role != Role::Admin {
            warn!(
                "User {} attempted to change role of {} without rights",
                caller.id, target_id
            );
            return Ok(false);
        }
        if new_role == Role::Admin {
            warn!("Attempted to change user {} to admin role", target_id);
            return Ok(false);
        }

        let changed = self.store.update_user_role(target_id, new_role)?;
        if changed {
            info!("Changed user {} role to {}", target_id, new_role);
        } else {
            warn!("Role change for user {} refused or target missing", target_id);
        }
        Ok(changed)
    }

    /// Admin callers only; Admin targets are protected at the store layer.
    pub fn delete_user(&self, caller: &Caller, target_id: Uuid) -> Result<bool> {
        if caller.role != Role::Admin {
            warn!(
                "User {} attempted to delete user {} without rights",
                caller.id, target_id
            );
            return Ok(false);
        }

        let deleted = self.store.delete_user(target_id)?;
        if deleted {
            info!("Deleted user {}", target_id);
        } else {
            warn!("Delete of user {} refused or target missing", target_id);
        }
        Ok(deleted)
    }

    // -- Tags --

    /// Admin callers manage the tag vocabulary.
    pub fn create_tag(&self, caller: &Caller, name: &str, color: &str) -> Result<Option<Tag>> {
        if caller.role != Role::Admin {
            warn!("User {} attempted to create a tag", caller.id);
            return Ok(None);
        }

        let tag = self.store.create_tag(name, color)?;
        info!("Created tag {} '{}'", tag.id, tag.name);
        Ok(Some(tag))
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        self.store.list_tags()
    }

    pub fn get_tag(&self, tag_id: Uuid) -> Result<Option<Tag>> {
        self.store.find_tag(tag_id)
    }
}
