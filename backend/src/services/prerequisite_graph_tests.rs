use super::*;
use crate::api::Course;
use crate::db::repositories::LocalRepository;

async fn catalog(edges: &[(&str, &str)]) -> LocalRepository {
    let repo = LocalRepository::new();
    for (course, prereq) in edges {
        repo.upsert_course(&Course::new(*course, 3)).await.unwrap();
        repo.upsert_course(&Course::new(*prereq, 3)).await.unwrap();
        repo.insert_prerequisite(&CourseId::new(course), &CourseId::new(prereq))
            .await
            .unwrap();
    }
    repo
}

fn ids(graph: &PrerequisiteGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn edge_pairs(graph: &PrerequisiteGraph) -> Vec<(&str, &str)> {
    graph
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str()))
        .collect()
}

#[tokio::test]
async fn test_course_without_prerequisites() {
    let repo = catalog(&[]).await;
    repo.upsert_course(&Course::new("CS101", 3)).await.unwrap();

    let graph = build_prerequisite_graph(&repo, &CourseId::new("cs101"))
        .await
        .unwrap();
    assert_eq!(ids(&graph), vec!["CS101"]);
    assert!(graph.edges.is_empty());
    assert!(graph.nodes[0].is_root);
    assert_eq!(graph.nodes[0].label, "CS101");
}

#[tokio::test]
async fn test_unknown_root_is_single_node() {
    let repo = LocalRepository::new();
    let graph = build_prerequisite_graph(&repo, &CourseId::new("NOPE999"))
        .await
        .unwrap();
    assert_eq!(ids(&graph), vec!["NOPE999"]);
    assert!(graph.edges.is_empty());
}

#[tokio::test]
async fn test_chain_edges_point_to_dependent() {
    let repo = catalog(&[("CS374", "CS225"), ("CS225", "CS125")]).await;
    let graph = build_prerequisite_graph(&repo, &CourseId::new("CS374"))
        .await
        .unwrap();

    assert_eq!(ids(&graph), vec!["CS374", "CS225", "CS125"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![("CS225", "CS374"), ("CS125", "CS225")]
    );
}

#[tokio::test]
async fn test_cycle_terminates_without_duplicates() {
    // A requires B, B requires C, C requires A
    let repo = catalog(&[("A", "B"), ("B", "C"), ("C", "A")]).await;
    let graph = build_prerequisite_graph(&repo, &CourseId::new("A"))
        .await
        .unwrap();

    assert_eq!(ids(&graph), vec!["A", "B", "C"]);
    assert_eq!(edge_pairs(&graph), vec![("B", "A"), ("C", "B"), ("A", "C")]);
}

#[tokio::test]
async fn test_self_loop() {
    let repo = catalog(&[("A", "A")]).await;
    let graph = build_prerequisite_graph(&repo, &CourseId::new("A"))
        .await
        .unwrap();
    assert_eq!(ids(&graph), vec!["A"]);
    assert_eq!(edge_pairs(&graph), vec![("A", "A")]);
}

#[tokio::test]
async fn test_diamond_emits_shared_prerequisite_once() {
    // ROOT requires A and B; both require C
    let repo = catalog(&[("ROOT", "A"), ("ROOT", "B"), ("A", "C"), ("B", "C")]).await;
    let graph = build_prerequisite_graph(&repo, &CourseId::new("ROOT"))
        .await
        .unwrap();

    assert_eq!(ids(&graph), vec!["ROOT", "A", "C", "B"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![("A", "ROOT"), ("B", "ROOT"), ("C", "A"), ("C", "B")]
    );

    let unique: HashSet<_> = graph.edges.iter().collect();
    assert_eq!(unique.len(), graph.edges.len());
}

#[tokio::test]
async fn test_preorder_matches_depth_first_discovery() {
    // Depth-first: ROOT's edges, then all of A's subtree, then B's.
    let repo = catalog(&[
        ("ROOT", "A"),
        ("ROOT", "B"),
        ("A", "A1"),
        ("A1", "A2"),
        ("B", "B1"),
    ])
    .await;
    let graph = build_prerequisite_graph(&repo, &CourseId::new("ROOT"))
        .await
        .unwrap();

    assert_eq!(ids(&graph), vec!["ROOT", "A", "A1", "A2", "B", "B1"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("A", "ROOT"),
            ("B", "ROOT"),
            ("A1", "A"),
            ("A2", "A1"),
            ("B1", "B"),
        ]
    );
}

#[tokio::test]
async fn test_dangling_prerequisite_is_a_node() {
    let repo = LocalRepository::new();
    repo.insert_prerequisite(&CourseId::new("CS225"), &CourseId::new("CS999"))
        .await
        .unwrap();
    let graph = build_prerequisite_graph(&repo, &CourseId::new("CS225"))
        .await
        .unwrap();
    assert_eq!(ids(&graph), vec!["CS225", "CS999"]);
    assert!(!graph.nodes[1].is_root);
}

#[tokio::test]
async fn test_long_chain_does_not_recurse() {
    let repo = LocalRepository::new();
    for n in 1..2000 {
        repo.insert_prerequisite(
            &CourseId::new(format!("C{}", n)),
            &CourseId::new(format!("C{}", n - 1)),
        )
        .await
        .unwrap();
    }
    let graph = build_prerequisite_graph(&repo, &CourseId::new("C1999"))
        .await
        .unwrap();
    assert_eq!(graph.nodes.len(), 2000);
    assert_eq!(graph.edges.len(), 1999);
}

#[tokio::test]
async fn test_empty_root_is_invalid() {
    let repo = LocalRepository::new();
    let err = build_prerequisite_graph(&repo, &CourseId::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput(_)));
}
