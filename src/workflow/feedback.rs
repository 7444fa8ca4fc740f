//! Feedback threads.
//!
//! The API returns a submission's feedback as a flat list; replies point at
//! their parent through `parentFeedbackId`. `build_threads` turns that list
//! into a forest ordered by creation time.
//!
//! Malformed input is tolerated: a reply whose parent is missing is shown as
//! a top-level comment, and a parent cycle is broken at its earliest member,
//! which becomes top-level with the rest of the cycle and its replies nested
//! below. Each comment appears exactly once.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::SubmissionFeedback;

/// A comment and its nested replies.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackThread {
    pub comment: SubmissionFeedback,
    pub replies: Vec<FeedbackThread>,
}

impl FeedbackThread {
    /// Total replies at every depth below this comment.
    #[must_use]
    pub fn reply_count(&self) -> usize {
        self.replies.iter().map(|r| 1 + r.reply_count()).sum()
    }

    /// Depth-first walk yielding `(depth, comment)` pairs, root at depth 0.
    #[must_use]
    pub fn flatten(&self) -> Vec<(usize, &SubmissionFeedback)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a SubmissionFeedback)>) {
        out.push((depth, &self.comment));
        for reply in &self.replies {
            reply.flatten_into(depth + 1, out);
        }
    }
}

/// Group flat feedback into threads.
#[must_use]
pub fn build_threads(feedback: Vec<SubmissionFeedback>) -> Vec<FeedbackThread> {
    let mut items = feedback;
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let ids: HashSet<Uuid> = items.iter().map(|f| f.id).collect();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match item.parent_feedback_id {
            Some(parent) if parent != item.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(idx);
            }
            _ => roots.push(idx),
        }
    }

    let mut visited = vec![false; items.len()];
    let mut threads: Vec<(usize, FeedbackThread)> = Vec::new();
    for &root in &roots {
        if let Some(thread) = assemble(root, &items, &children, &mut visited) {
            threads.push((root, thread));
        }
    }

    // Whatever is still unvisited sits in or below a parent cycle; break
    // each cycle at its earliest member.
    let positions: HashMap<Uuid, usize> = items.iter().enumerate().map(|(idx, f)| (f.id, idx)).collect();
    for idx in 0..items.len() {
        if visited[idx] {
            continue;
        }
        let start = cycle_start(idx, &items, &positions);
        if let Some(thread) = assemble(start, &items, &children, &mut visited) {
            threads.push((start, thread));
        }
    }

    threads.sort_by_key(|(idx, _)| *idx);
    threads.into_iter().map(|(_, thread)| thread).collect()
}

/// Earliest member of the parent cycle reached by walking up from `idx`.
fn cycle_start(idx: usize, items: &[SubmissionFeedback], positions: &HashMap<Uuid, usize>) -> usize {
    let mut path: Vec<usize> = Vec::new();
    let mut current = idx;
    loop {
        if let Some(pos) = path.iter().position(|&seen| seen == current) {
            return path[pos..].iter().copied().min().unwrap_or(current);
        }
        path.push(current);
        match items[current].parent_feedback_id.and_then(|parent| positions.get(&parent)) {
            Some(&parent) => current = parent,
            None => return current,
        }
    }
}

fn assemble(
    idx: usize,
    items: &[SubmissionFeedback],
    children: &HashMap<Uuid, Vec<usize>>,
    visited: &mut [bool],
) -> Option<FeedbackThread> {
    if visited[idx] {
        return None;
    }
    visited[idx] = true;

    let comment = &items[idx];
    let replies = children
        .get(&comment.id)
        .map(|kids| kids.iter().filter_map(|&kid| assemble(kid, items, children, visited)).collect())
        .unwrap_or_default();

    Some(FeedbackThread { comment: comment.clone(), replies })
}

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;
