//! # Community Feed
//!
//! Local outfit sharing: posts, comments and the three feed orderings.
//!
//! Everything here is single-user and offline. Counters are plain integers
//! bumped on each interaction; nobody is tracked as having liked a post.
//! Only published posts can be seen or interacted with.

use crate::clock::Clock;
use crate::error::{DadaError, Result};
use crate::store::WardrobeStore;
use crate::types::{Comment, CommentId, CommunityPost, PostId, PostStatus, UserId};
use crate::wardrobe::{Wardrobe, contains_ignore_case, logged};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const SECS_PER_MINUTE: u64 = 60;

// =============================================================================
// FEED ORDERING
// =============================================================================

/// How the feed is ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedOrder {
    /// Newest first.
    Latest,
    /// Newest first, restricted to the given authors.
    Following(BTreeSet<UserId>),
    /// Engagement minus age, highest first.
    #[default]
    Mixed,
}

/// Engagement of a post in tenths: 30 per like, 50 per comment, minus one
/// per six minutes of age.
#[must_use]
pub fn engagement(post: &CommunityPost, now: u64) -> i64 {
    let age_minutes = now.saturating_sub(post.created_at) / SECS_PER_MINUTE;
    let likes = i64::from(post.like_count).saturating_mul(30);
    let comments = i64::from(post.comment_count).saturating_mul(50);
    likes
        .saturating_add(comments)
        .saturating_sub(i64::try_from(age_minutes / 6).unwrap_or(i64::MAX))
}

fn newest_posts_first(posts: &mut [CommunityPost]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Order visible posts for display. Hidden and deleted posts are dropped.
#[must_use]
pub fn order_feed(posts: Vec<CommunityPost>, order: &FeedOrder, now: u64) -> Vec<CommunityPost> {
    let mut visible: Vec<_> = posts.into_iter().filter(CommunityPost::is_visible).collect();
    match order {
        FeedOrder::Latest => newest_posts_first(&mut visible),
        FeedOrder::Following(authors) => {
            visible.retain(|p| authors.contains(&p.user_id));
            newest_posts_first(&mut visible);
        }
        FeedOrder::Mixed => {
            newest_posts_first(&mut visible);
            visible.sort_by_key(|p| std::cmp::Reverse(engagement(p, now)));
        }
    }
    visible
}

/// Topics of visible posts with their counts, most used first, then by name.
#[must_use]
pub fn count_topics(posts: &[CommunityPost], limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for post in posts.iter().filter(|p| p.is_visible()) {
        let unique: BTreeSet<&str> = post
            .topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        for topic in unique {
            *counts.entry(topic.to_string()).or_default() += 1;
        }
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then(a_name.cmp(b_name)));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// WARDROBE COMMUNITY OPERATIONS
// =============================================================================

impl<S: WardrobeStore, C: Clock> Wardrobe<S, C> {
    /// Publish a post. Counters start at zero.
    ///
    /// A post needs text or at least one image.
    pub fn publish_post(&mut self, mut post: CommunityPost) -> Result<CommunityPost> {
        if post.content.trim().is_empty() && post.image_uris.is_empty() {
            return Err(DadaError::InvalidArgument(
                "post needs content or an image".to_string(),
            ));
        }
        let now = self.now();
        post.status = PostStatus::Published;
        post.like_count = 0;
        post.favorite_count = 0;
        post.comment_count = 0;
        post.share_count = 0;
        post.created_at = now;
        post.updated_at = now;
        let id = logged("publish_post", self.store_mut().insert_post(post.clone()))?;
        post.id = id;
        info!(post = %id, user = %post.user_id, "published post");
        Ok(post)
    }

    /// A visible post by id.
    pub fn get_post(&self, id: PostId) -> Result<Option<CommunityPost>> {
        Ok(logged("get_post", self.store().get_post(id))?.filter(CommunityPost::is_visible))
    }

    /// Apply `change` to a visible post and store it.
    fn touch_post(
        &mut self,
        operation: &'static str,
        id: PostId,
        change: impl FnOnce(&mut CommunityPost),
    ) -> Result<Option<CommunityPost>> {
        let Some(mut post) = self.get_post(id)? else {
            debug!(post = %id, operation, "post not visible");
            return Ok(None);
        };
        change(&mut post);
        post.updated_at = self.now();
        if !logged(operation, self.store_mut().put_post(post.clone()))? {
            return Ok(None);
        }
        info!(post = %id, operation, "updated post");
        Ok(Some(post))
    }

    pub fn like_post(&mut self, id: PostId) -> Result<Option<CommunityPost>> {
        self.touch_post("like_post", id, |p| {
            p.like_count = p.like_count.saturating_add(1);
        })
    }

    pub fn collect_post(&mut self, id: PostId) -> Result<Option<CommunityPost>> {
        self.touch_post("collect_post", id, |p| {
            p.favorite_count = p.favorite_count.saturating_add(1);
        })
    }

    pub fn share_post(&mut self, id: PostId) -> Result<Option<CommunityPost>> {
        self.touch_post("share_post", id, |p| {
            p.share_count = p.share_count.saturating_add(1);
        })
    }

    /// Take a post out of the feed without deleting it.
    pub fn hide_post(&mut self, id: PostId) -> Result<bool> {
        Ok(self
            .touch_post("hide_post", id, |p| p.status = PostStatus::Hidden)?
            .is_some())
    }

    /// Soft-delete a post. Its comments stay in the store.
    pub fn delete_post(&mut self, id: PostId) -> Result<bool> {
        Ok(self
            .touch_post("delete_post", id, |p| p.status = PostStatus::Deleted)?
            .is_some())
    }

    /// Comment on a visible post, optionally replying to another comment.
    ///
    /// `None` if the post is not visible. A reply must point at a comment on
    /// the same post.
    pub fn add_comment(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        content: &str,
        parent: Option<CommentId>,
    ) -> Result<Option<Comment>> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DadaError::InvalidArgument(
                "comment content is empty".to_string(),
            ));
        }
        if self.get_post(post_id)?.is_none() {
            return Ok(None);
        }
        if let Some(parent_id) = parent {
            let parent_post = logged("add_comment", self.store().get_comment(parent_id))?
                .map(|c| c.post_id);
            if parent_post != Some(post_id) {
                return Err(DadaError::InvalidArgument(format!(
                    "comment {parent_id} is not on post {post_id}"
                )));
            }
        }

        let mut comment = Comment {
            post_id,
            user_id,
            content: content.to_string(),
            parent_comment_id: parent,
            created_at: self.now(),
            ..Comment::default()
        };
        let id = logged("add_comment", self.store_mut().insert_comment(comment.clone()))?;
        comment.id = id;
        self.touch_post("add_comment", post_id, |p| {
            p.comment_count = p.comment_count.saturating_add(1);
        })?;
        info!(post = %post_id, comment = %id, "added comment");
        Ok(Some(comment))
    }

    /// Comments on a post, oldest first.
    pub fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
        let mut comments = logged("comments_for_post", self.store().comments())?;
        comments.retain(|c| c.post_id == post_id);
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    /// The feed in the requested order.
    pub fn feed(&self, order: &FeedOrder) -> Result<Vec<CommunityPost>> {
        let posts = logged("feed", self.store().posts())?;
        Ok(order_feed(posts, order, self.now()))
    }

    /// Visible posts matching `text` in their content, topics or the
    /// sub-category of a tagged item. Newest first.
    pub fn search_posts(&self, text: &str) -> Result<Vec<CommunityPost>> {
        let text = text.trim();
        let mut posts = self.feed(&FeedOrder::Latest)?;
        if text.is_empty() {
            return Ok(posts);
        }
        let mut tagged_names: BTreeMap<_, String> = BTreeMap::new();
        for item in logged("search_posts", self.store().items())? {
            tagged_names.insert(item.id, item.sub_category);
        }
        posts.retain(|post| {
            contains_ignore_case(&post.content, text)
                || post.topics.iter().any(|t| contains_ignore_case(t, text))
                || post.tagged_items.iter().any(|tag| {
                    tagged_names
                        .get(&tag.item_id)
                        .is_some_and(|name| contains_ignore_case(name, text))
                })
        });
        Ok(posts)
    }

    /// The `limit` most used topics across visible posts.
    pub fn trending_topics(&self, limit: usize) -> Result<Vec<(String, usize)>> {
        let posts = logged("trending_topics", self.store().posts())?;
        Ok(count_topics(&posts, limit))
    }
}

// =============================================================================
// TESTS
// =============================================================================
