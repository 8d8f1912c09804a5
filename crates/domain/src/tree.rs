use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

use crate::models::{CommentId, CommentNode, CommentRecord};

/// Deepest nesting a rendered tree may reach. Replies below it are cut loose to the top
/// level, the same way orphans are. The write-path depth limit keeps real threads far
/// shallower; only corrupted chains get here.
pub const MAX_NESTING: usize = 64;

/// Newest first, ties broken by id ascending.
pub fn newest_first(a: &CommentNode, b: &CommentNode) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Threads a flat set of comment records into a forest of top-level nodes.
///
/// Suspended records are dropped before threading. A record whose parent cannot be
/// resolved (missing, suspended, itself, or part of a reference cycle) is promoted to
/// the top level, so every visible record ends up in the forest exactly once.
/// Grouping is by `parent_id` only; records from several posts may be mixed.
pub fn assemble<I>(records: I) -> Vec<CommentNode>
where
    I: IntoIterator<Item = CommentRecord>,
{
    let mut index: HashMap<CommentId, usize> = HashMap::new();
    let mut nodes: Vec<CommentNode> = Vec::new();

    for record in records {
        if record.is_suspended {
            continue;
        }
        if index.contains_key(&record.id) {
            warn!(comment_id = %record.id, "Duplicate comment record ignored");
            continue;
        }
        index.insert(record.id.clone(), nodes.len());
        nodes.push(record.into());
    }

    let parents = resolve_parents(&nodes, &index);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (idx, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(idx),
            None => roots.push(idx),
        }
    }

    cap_nesting(&mut roots, &mut children);

    roots.sort_by(|&a, &b| newest_first(&nodes[a], &nodes[b]));
    for siblings in children.iter_mut() {
        siblings.sort_by(|&a, &b| newest_first(&nodes[a], &nodes[b]));
    }

    build_forest(nodes, &roots, &children)
}

/// Effective parent index of every node, after orphan promotion and cycle breaking.
fn resolve_parents(nodes: &[CommentNode], index: &HashMap<CommentId, usize>) -> Vec<Option<usize>> {
    let declared: Vec<Option<usize>> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let parent_id = node.parent_id.as_ref()?;
            match index.get(parent_id) {
                Some(&p) if p != idx => Some(p),
                Some(_) => {
                    warn!(comment_id = %node.id, "Comment is its own parent, promoted to top level");
                    None
                }
                None => {
                    debug!(comment_id = %node.id, parent_id = %parent_id, "Dangling parent, promoted to top level");
                    None
                }
            }
        })
        .collect();

    // Records are settled in input order. A record whose parent chain leads back to
    // itself closes a cycle and is cut loose; already-settled records never change.
    let mut resolved: Vec<Option<usize>> = Vec::with_capacity(nodes.len());
    let mut grounded: Vec<bool> = Vec::with_capacity(nodes.len());

    for idx in 0..nodes.len() {
        let parent = declared[idx].filter(|&p| {
            if leads_back(idx, p, &declared, &resolved, &grounded) {
                warn!(comment_id = %nodes[idx].id, "Reply cycle detected, promoted to top level");
                false
            } else {
                true
            }
        });
        let reaches_root = match parent {
            None => true,
            Some(p) => p < idx && grounded[p],
        };
        grounded.push(reaches_root);
        resolved.push(parent);
    }

    resolved
}

fn leads_back(
    start: usize,
    parent: usize,
    declared: &[Option<usize>],
    resolved: &[Option<usize>],
    grounded: &[bool],
) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = Some(parent);

    while let Some(current) = cursor {
        if current == start {
            return true;
        }
        let settled = current < resolved.len();
        if (settled && grounded[current]) || !seen.insert(current) {
            return false;
        }
        cursor = if settled {
            resolved[current]
        } else {
            declared[current]
        };
    }

    false
}

fn cap_nesting(roots: &mut Vec<usize>, children: &mut [Vec<usize>]) {
    let mut queue: VecDeque<(usize, usize)> = roots.iter().map(|&idx| (idx, 0)).collect();
    while let Some((idx, level)) = queue.pop_front() {
        if level + 1 < MAX_NESTING {
            queue.extend(children[idx].iter().map(|&child| (child, level + 1)));
            continue;
        }
        // 超出嵌套上限，提升为顶层
        for child in std::mem::take(&mut children[idx]) {
            roots.push(child);
            queue.push_back((child, 0));
        }
    }
}

fn build_forest(nodes: Vec<CommentNode>, roots: &[usize], children: &[Vec<usize>]) -> Vec<CommentNode> {
    // 广度优先：父节点总在子节点之前
    let mut order = Vec::with_capacity(nodes.len());
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        queue.extend(children[idx].iter().copied());
    }

    let mut slots: Vec<Option<CommentNode>> = nodes.into_iter().map(Some).collect();
    for &idx in order.iter().rev() {
        let replies: Vec<CommentNode> = children[idx]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(node) = slots[idx].as_mut() {
            node.replies = replies;
        }
    }

    roots.iter().filter_map(|&idx| slots[idx].take()).collect()
}
