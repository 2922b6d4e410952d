//! Family tree construction.
//!
//! Converts the flat member roster into the single rooted hierarchy the
//! frontend renders. The build is pure and synchronous: it operates on an
//! in-memory snapshot and is redone from scratch on every read.
//!
//! Malformed data never fails the build. Dangling parent references behave
//! as if unset, unreachable members are omitted, and cyclic parent links are
//! cut by tracking the ids on the current root-to-node path.

use std::collections::{HashMap, HashSet};

use crate::models::{FamilyMember, FamilyTitle, NodeAttributes, TreeNode};

/// Build the family tree from the flat member list.
///
/// Returns `None` for an empty roster. Input order (the repository's
/// insertion order) breaks all ties: root selection among equal candidates
/// and the ordering of children under a node, so equal input always produces
/// a structurally equal tree.
pub fn build_tree(members: &[FamilyMember]) -> Option<TreeNode> {
    if members.is_empty() {
        return None;
    }

    let children_of = index_children(members);
    let mut path = HashSet::new();
    Some(build_node(select_root(members), &children_of, &mut path))
}

/// Root selection precedence:
/// 1. the member titled Patriarche,
/// 2. a structural root (neither father nor mother recorded),
/// 3. the first member.
///
/// Within each rule the first match in input order wins, which also resolves
/// duplicate Patriarche titles deterministically.
fn select_root(members: &[FamilyMember]) -> &FamilyMember {
    members
        .iter()
        .find(|m| m.title == FamilyTitle::Patriarche)
        .or_else(|| {
            members.iter().find(|m| {
                parent_link(&m.father_id).is_none() && parent_link(&m.mother_id).is_none()
            })
        })
        .unwrap_or(&members[0])
}

/// A parent reference counts only when present and non-empty; blank ids from
/// older clients behave as unset.
fn parent_link(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Index members by the parent they point at, preserving input order.
///
/// A member whose father and mother fields name the same id is linked to that
/// parent once.
fn index_children(members: &[FamilyMember]) -> HashMap<&str, Vec<&FamilyMember>> {
    let mut index: HashMap<&str, Vec<&FamilyMember>> = HashMap::new();
    for member in members {
        let father = parent_link(&member.father_id);
        let mother = parent_link(&member.mother_id).filter(|m| Some(*m) != father);
        for parent in [father, mother].into_iter().flatten() {
            index.entry(parent).or_default().push(member);
        }
    }
    index
}

/// Recursively assemble the node for `member`.
///
/// `path` holds the ids currently being expanded between the root and this
/// node; a candidate child already on the path closes a cycle and is skipped.
/// A member may still appear under both its father and its mother, since
/// those are two distinct paths.
fn build_node<'a>(
    member: &'a FamilyMember,
    children_of: &HashMap<&'a str, Vec<&'a FamilyMember>>,
    path: &mut HashSet<&'a str>,
) -> TreeNode {
    path.insert(member.id.as_str());

    let mut children = Vec::new();
    if let Some(candidates) = children_of.get(member.id.as_str()) {
        for &child in candidates {
            if path.contains(child.id.as_str()) {
                continue;
            }
            children.push(build_node(child, children_of, path));
        }
    }

    path.remove(member.id.as_str());

    TreeNode {
        id: member.id.clone(),
        name: member.full_name(),
        title: member.title,
        photo_url: member.photo_url.clone(),
        attributes: NodeAttributes {
            birth_date: member.birth_date.clone(),
            current_location: member.current_location.clone(),
            situation: member.situation.clone(),
        },
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, first_name: &str, title: FamilyTitle) -> FamilyMember {
        FamilyMember {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: "Diop".to_string(),
            title,
            father_id: None,
            mother_id: None,
            email: format!("{}@example.com", id),
            birth_date: None,
            birth_place: None,
            current_location: None,
            phone: None,
            country: None,
            photo_url: None,
            situation: None,
            profession: None,
            is_admin: false,
            is_patriarch: false,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
            version: 1,
        }
    }

    fn child_of(
        id: &str,
        first_name: &str,
        father: Option<&str>,
        mother: Option<&str>,
    ) -> FamilyMember {
        let mut m = member(id, first_name, FamilyTitle::Fils);
        m.father_id = father.map(str::to_string);
        m.mother_id = mother.map(str::to_string);
        m
    }

    fn collect_ids(node: &TreeNode, out: &mut Vec<String>) {
        out.push(node.id.clone());
        for child in node.children.iter().flatten() {
            collect_ids(child, out);
        }
    }

    #[test]
    fn test_empty_roster_builds_no_tree() {
        assert_eq!(build_tree(&[]), None);
    }

    #[test]
    fn test_singleton_is_a_leaf_root() {
        let roster = vec![member("a", "Awa", FamilyTitle::Membre)];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "a");
        assert_eq!(tree.name, "Awa Diop");
        assert!(tree.children.is_none());
    }

    #[test]
    fn test_patriarch_wins_over_structural_root_in_any_order() {
        let a = member("a", "Abdou", FamilyTitle::Membre);
        let b = member("b", "Birane", FamilyTitle::Patriarche);
        let c = child_of("c", "Coumba", Some("b"), None);

        let orders: [[&FamilyMember; 3]; 3] = [[&a, &b, &c], [&c, &b, &a], [&b, &c, &a]];
        for order in orders {
            let roster: Vec<FamilyMember> = order.into_iter().cloned().collect();
            let tree = build_tree(&roster).unwrap();
            assert_eq!(tree.id, "b");
            let children = tree.children.as_deref().unwrap();
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].id, "c");
        }
    }

    #[test]
    fn test_structural_root_fallback_without_patriarch() {
        let roster = vec![
            child_of("c", "Coumba", Some("a"), None),
            member("a", "Abdou", FamilyTitle::Pere),
        ];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "a");
    }

    #[test]
    fn test_first_member_fallback_when_everyone_has_parents() {
        // No patriarch and every member carries a parent link.
        let roster = vec![
            child_of("x", "Xavier", Some("y"), None),
            child_of("y", "Yacine", Some("x"), None),
        ];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "x");
    }

    #[test]
    fn test_dangling_parent_reference_is_tolerated() {
        let roster = vec![child_of("b", "Birane", Some("missing"), None)];
        let tree = build_tree(&roster).unwrap();
        // The only member becomes root by fallback; the bad link is inert.
        assert_eq!(tree.id, "b");
        assert!(tree.children.is_none());
    }

    #[test]
    fn test_unreachable_member_is_omitted() {
        let roster = vec![
            member("a", "Abdou", FamilyTitle::Patriarche),
            child_of("b", "Birane", Some("missing"), None),
        ];
        let tree = build_tree(&roster).unwrap();
        let mut ids = Vec::new();
        collect_ids(&tree, &mut ids);
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_reciprocal_parent_cycle_terminates() {
        let roster = vec![
            child_of("x", "Xavier", Some("y"), None),
            child_of("y", "Yacine", Some("x"), None),
        ];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "x");
        let children = tree.children.as_deref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "y");
        // The cycle back to the root is cut, not expanded.
        assert!(children[0].children.is_none());
    }

    #[test]
    fn test_self_reference_terminates() {
        let roster = vec![child_of("z", "Zal", Some("z"), None)];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "z");
        assert!(tree.children.is_none());
    }

    #[test]
    fn test_same_parent_in_both_fields_links_once() {
        let roster = vec![
            member("p", "Pape", FamilyTitle::Patriarche),
            child_of("c", "Coumba", Some("p"), Some("p")),
        ];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.children.as_deref().unwrap().len(), 1);
    }

    #[test]
    fn test_member_appears_under_father_and_mother() {
        // The mother is herself a child of the patriarch, so the grandchild
        // is reachable along two distinct paths.
        let roster = vec![
            member("f", "Fallou", FamilyTitle::Patriarche),
            child_of("m", "Mame", Some("f"), None),
            child_of("c", "Coumba", Some("f"), Some("m")),
        ];
        let tree = build_tree(&roster).unwrap();
        let mut ids = Vec::new();
        collect_ids(&tree, &mut ids);
        assert_eq!(ids.iter().filter(|id| *id == "c").count(), 2);
        // Each path expands the grandchild at most once.
        assert_eq!(ids.iter().filter(|id| *id == "m").count(), 1);
    }

    #[test]
    fn test_blank_parent_id_counts_as_unset() {
        let mut a = member("a", "Abdou", FamilyTitle::Membre);
        a.father_id = Some(String::new());
        a.mother_id = Some("  ".to_string());
        let roster = vec![child_of("b", "Birane", Some("a"), None), a];
        // "a" is the structural root despite the blank strings.
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "a");
    }

    #[test]
    fn test_duplicate_patriarch_titles_resolve_to_first() {
        let roster = vec![
            member("p1", "Pape", FamilyTitle::Patriarche),
            member("p2", "Pierre", FamilyTitle::Patriarche),
        ];
        let tree = build_tree(&roster).unwrap();
        assert_eq!(tree.id, "p1");
    }

    #[test]
    fn test_children_follow_insertion_order() {
        let roster = vec![
            member("p", "Pape", FamilyTitle::Patriarche),
            child_of("c3", "Coumba", Some("p"), None),
            child_of("c1", "Cheikh", Some("p"), None),
            child_of("c2", "Codou", Some("p"), None),
        ];
        let tree = build_tree(&roster).unwrap();
        let order: Vec<&str> = tree
            .children
            .as_deref()
            .unwrap()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["c3", "c1", "c2"]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let roster = vec![
            member("p", "Pape", FamilyTitle::Patriarche),
            child_of("a", "Awa", Some("p"), None),
            child_of("b", "Birane", Some("p"), Some("a")),
            child_of("c", "Coumba", Some("b"), None),
        ];
        let first = build_tree(&roster);
        let second = build_tree(&roster);
        assert_eq!(first, second);
    }

    #[test]
    fn test_node_carries_display_attributes() {
        let mut p = member("p", "Pape", FamilyTitle::Patriarche);
        p.birth_date = Some("1950-02-11".to_string());
        p.current_location = Some("Dakar".to_string());
        p.situation = Some("Marié(e)".to_string());
        p.photo_url = Some("https://example.com/p.jpg".to_string());

        let tree = build_tree(&[p]).unwrap();
        assert_eq!(tree.title, FamilyTitle::Patriarche);
        assert_eq!(tree.photo_url.as_deref(), Some("https://example.com/p.jpg"));
        assert_eq!(tree.attributes.birth_date.as_deref(), Some("1950-02-11"));
        assert_eq!(tree.attributes.current_location.as_deref(), Some("Dakar"));
        assert_eq!(tree.attributes.situation.as_deref(), Some("Marié(e)"));
    }
}
