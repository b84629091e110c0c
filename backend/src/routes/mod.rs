pub mod catalog;
pub mod credits;
pub mod graph;
pub mod plans;
pub mod requirements;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        // Test that all route module constants are accessible
        assert_eq!(super::catalog::LIST_COURSES, "list_courses");
        assert_eq!(super::catalog::SEARCH_COURSES, "search_courses");
        assert_eq!(
            super::graph::GET_PREREQUISITE_GRAPH,
            "get_prerequisite_graph"
        );
        assert_eq!(
            super::requirements::GET_FULFILLED_REQUIREMENTS,
            "get_fulfilled_requirements"
        );
        assert_eq!(super::credits::GET_SEMESTER_CREDITS, "get_semester_credits");
        assert_eq!(super::credits::GET_TOTAL_CREDITS, "get_total_credits");
        assert_eq!(super::plans::ADD_COURSE, "add_course");
        assert_eq!(super::plans::REMOVE_COURSE, "remove_course");
    }
}
