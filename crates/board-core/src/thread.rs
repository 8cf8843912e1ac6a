//! Comment threads - tree assembly over a post's flat comment list
//!
//! Comments are stored flat with a `parent_id`. The tree is rebuilt on every
//! read as an arena (`Vec` of comments) plus an id index; child lists are
//! derived here and never persisted.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::{Comment, COMMENT_HEAT_WEIGHT};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Ordering applied to the top level of a thread listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    CreatedAsc,
    #[default]
    CreatedDesc,
    HeatAsc,
    HeatDesc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
            Self::HeatAsc => "heat_asc",
            Self::HeatDesc => "heat_desc",
        }
    }
}

impl FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_asc" | "oldest" => Ok(Self::CreatedAsc),
            "created_desc" | "newest" | "time" => Ok(Self::CreatedDesc),
            "heat_asc" => Ok(Self::HeatAsc),
            "heat_desc" | "heat" | "hot" => Ok(Self::HeatDesc),
            other => Err(DomainError::ValidationError(format!(
                "unknown sort mode: {other}"
            ))),
        }
    }
}

/// A comment with its derived children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode {
    pub comment: Comment,
    /// reactions + 5 x descendants
    pub heat: i64,
    pub descendant_count: i64,
    pub replies: Vec<ThreadNode>,
}

/// Where an agent reply is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPlacement {
    pub parent_id: Option<Snowflake>,
    pub depth: i32,
}

/// Flattening rule for agent replies
///
/// A top-level candidate gets the reply directly underneath it. Deeper
/// candidates get the reply under their root, so agent replies never go past
/// depth 2. Without a root the reply becomes a top-level comment.
pub fn agent_placement(candidate: &Comment, root: Option<&Comment>) -> ReplyPlacement {
    if candidate.depth <= 1 {
        return ReplyPlacement {
            parent_id: Some(candidate.id),
            depth: 2,
        };
    }
    match root {
        Some(root) if root.is_root() => ReplyPlacement {
            parent_id: Some(root.id),
            depth: 2,
        },
        _ => ReplyPlacement {
            parent_id: None,
            depth: 1,
        },
    }
}

/// Arena-backed comment tree for one post
#[derive(Debug, Default)]
pub struct CommentTree {
    nodes: Vec<Comment>,
    index: HashMap<Snowflake, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl CommentTree {
    /// Build the tree; comments whose parent is missing become roots
    pub fn build(comments: Vec<Comment>) -> Self {
        let index: HashMap<Snowflake, usize> = comments
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let mut children = vec![Vec::new(); comments.len()];
        let mut roots = Vec::new();

        for (i, comment) in comments.iter().enumerate() {
            match comment.parent_id.and_then(|p| index.get(&p).copied()) {
                Some(parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }

        // Child levels are always chronological
        for list in &mut children {
            list.sort_by(|&a, &b| chronological(&comments[a], &comments[b]));
        }

        Self {
            nodes: comments,
            index,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Snowflake) -> Option<&Comment> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Ids of the subtree rooted at `id`, descendants before their ancestors
    pub fn deletion_order(&self, id: Snowflake) -> Option<Vec<Snowflake>> {
        let start = *self.index.get(&id)?;
        let mut order = Vec::new();
        let mut stack = vec![(start, false)];

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                order.push(self.nodes[idx].id);
                continue;
            }
            stack.push((idx, true));
            for &child in self.children[idx].iter().rev() {
                stack.push((child, false));
            }
        }
        Some(order)
    }

    /// Parent chain ending at `id`, oldest first, at most `max_hops` ancestors
    pub fn context_chain(&self, id: Snowflake, max_hops: usize) -> Vec<&Comment> {
        let Some(mut current) = self.get(id) else {
            return Vec::new();
        };
        let mut chain = vec![current];
        while chain.len() <= max_hops {
            match current.parent_id.and_then(|p| self.get(p)) {
                Some(parent) if parent.id != current.id => {
                    chain.push(parent);
                    current = parent;
                }
                _ => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Top-level ancestor of `id`, or `None` if the chain is broken
    pub fn root_of(&self, id: Snowflake) -> Option<&Comment> {
        let mut current = self.get(id)?;
        for _ in 0..self.nodes.len() {
            match current.parent_id {
                None => return Some(current),
                Some(parent) => current = self.get(parent)?,
            }
        }
        None
    }

    /// Consume the tree into sorted threads
    ///
    /// `author_filter` keeps only roots written by the named author (user id
    /// or display name). Replies under a kept root are always included.
    pub fn into_threads(self, sort: SortMode, author_filter: Option<&str>) -> Vec<ThreadNode> {
        let Self {
            nodes,
            children,
            roots,
            ..
        } = self;
        let mut slots: Vec<Option<Comment>> = nodes.into_iter().map(Some).collect();

        let kept: Vec<usize> = roots
            .into_iter()
            .filter(|&r| match (author_filter, &slots[r]) {
                (Some(filter), Some(c)) => c.author.matches_filter(filter),
                _ => true,
            })
            .collect();

        let mut threads: Vec<ThreadNode> = kept
            .into_iter()
            .filter_map(|r| assemble(r, &children, &mut slots))
            .collect();

        threads.sort_by(|a, b| compare_roots(a, b, sort));
        threads
    }
}

fn assemble(idx: usize, children: &[Vec<usize>], slots: &mut [Option<Comment>]) -> Option<ThreadNode> {
    let comment = slots[idx].take()?;
    let replies: Vec<ThreadNode> = children[idx]
        .iter()
        .filter_map(|&c| assemble(c, children, slots))
        .collect();
    let descendant_count = replies
        .iter()
        .map(|r| 1 + r.descendant_count)
        .sum::<i64>();
    let heat = comment.reaction_count() + COMMENT_HEAT_WEIGHT * descendant_count;

    Some(ThreadNode {
        comment,
        heat,
        descendant_count,
        replies,
    })
}

fn chronological(a: &Comment, b: &Comment) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

fn compare_roots(a: &ThreadNode, b: &ThreadNode, sort: SortMode) -> Ordering {
    match sort {
        SortMode::CreatedAsc => chronological(&a.comment, &b.comment),
        SortMode::CreatedDesc => chronological(&b.comment, &a.comment),
        SortMode::HeatAsc => a.heat.cmp(&b.heat).then(a.comment.id.cmp(&b.comment.id)),
        SortMode::HeatDesc => b.heat.cmp(&a.heat).then(b.comment.id.cmp(&a.comment.id)),
    }
}
