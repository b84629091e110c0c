//! In-memory repository for unit testing and local development.
//!
//! All tables live in one [`LocalState`] behind a single `RwLock`, so every
//! read sees a consistent snapshot and every write is atomic with respect to
//! other operations.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::api::{
    AcademicPlan, ApCredit, BypassLogEntry, Course, CourseId, MajorId, PlanId, PlannedCourse,
    PlannedCourseDetail, Prerequisite, Requirement, Student, StudentId,
};
use crate::db::repository::{
    CatalogRepository, ErrorContext, PlanRepository, RepositoryError, RepositoryResult,
};

#[derive(Debug, Default)]
struct LocalState {
    courses: BTreeMap<CourseId, Course>,
    /// (course, prerequisite) edges in insertion order
    prerequisites: Vec<(CourseId, CourseId)>,
    requirements: Vec<Requirement>,
    ap_credits: Vec<ApCredit>,
    students: BTreeMap<StudentId, Student>,
    plans: BTreeMap<PlanId, AcademicPlan>,
    /// Planned courses in insertion order
    planned: Vec<PlannedCourse>,
    bypass_log: Vec<BypassLogEntry>,
    next_plan_id: i64,
}

impl LocalState {
    fn credits_of(&self, course_id: &CourseId) -> u32 {
        self.courses.get(course_id).map(|c| c.credits).unwrap_or(0)
    }

    fn detail(&self, entry: &PlannedCourse) -> PlannedCourseDetail {
        PlannedCourseDetail {
            plan_id: entry.plan_id,
            course_id: entry.course_id.clone(),
            semester: entry.semester.clone(),
            credits: self.credits_of(&entry.course_id),
        }
    }
}

/// In-memory implementation of the store traits.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    state: Arc<RwLock<LocalState>>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of planned-course rows across all plans.
    pub fn planned_course_count(&self) -> usize {
        self.state.read().planned.len()
    }

    /// Number of bypass log entries across all plans.
    pub fn bypass_log_count(&self) -> usize {
        self.state.read().bypass_log.len()
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        Ok(self.state.read().courses.values().cloned().collect())
    }

    async fn search_courses(&self, term: &str, limit: usize) -> RepositoryResult<Vec<Course>> {
        let needle = term.trim().to_uppercase();
        let state = self.state.read();
        Ok(state
            .courses
            .values()
            .filter(|c| c.course_id.as_str().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_course(&self, course_id: &CourseId) -> RepositoryResult<Option<Course>> {
        Ok(self.state.read().courses.get(course_id).cloned())
    }

    async fn upsert_course(&self, course: &Course) -> RepositoryResult<()> {
        self.state
            .write()
            .courses
            .insert(course.course_id.clone(), course.clone());
        Ok(())
    }

    async fn get_prerequisites(&self, course_id: &CourseId) -> RepositoryResult<Vec<Prerequisite>> {
        let state = self.state.read();
        Ok(state
            .prerequisites
            .iter()
            .filter(|(course, _)| course == course_id)
            .map(|(course, prereq)| Prerequisite {
                course_id: course.clone(),
                prerequisite_id: prereq.clone(),
                prerequisite_credits: state.courses.get(prereq).map(|c| c.credits),
            })
            .collect())
    }

    async fn insert_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write();
        let edge = (course_id.clone(), prerequisite_id.clone());
        if !state.prerequisites.contains(&edge) {
            state.prerequisites.push(edge);
        }
        Ok(())
    }

    async fn get_requirements(&self, major_id: &MajorId) -> RepositoryResult<Vec<Requirement>> {
        Ok(self
            .state
            .read()
            .requirements
            .iter()
            .filter(|r| &r.major_id == major_id)
            .cloned()
            .collect())
    }

    async fn list_majors(&self) -> RepositoryResult<Vec<MajorId>> {
        let state = self.state.read();
        let majors: BTreeSet<MajorId> = state
            .requirements
            .iter()
            .map(|r| r.major_id.clone())
            .collect();
        Ok(majors.into_iter().collect())
    }

    async fn insert_requirement(&self, requirement: &Requirement) -> RepositoryResult<()> {
        let mut state = self.state.write();
        let exists = state
            .requirements
            .iter()
            .any(|r| r.major_id == requirement.major_id && r.course_id == requirement.course_id);
        if !exists {
            state.requirements.push(requirement.clone());
        }
        Ok(())
    }

    async fn list_ap_course_names(&self) -> RepositoryResult<Vec<String>> {
        let state = self.state.read();
        let names: BTreeSet<String> = state
            .ap_credits
            .iter()
            .map(|c| c.course_name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn find_ap_course_mapping(
        &self,
        course_name: &str,
        score: i32,
    ) -> RepositoryResult<Option<CourseId>> {
        let name = course_name.trim();
        Ok(self
            .state
            .read()
            .ap_credits
            .iter()
            .filter(|c| c.score == score && c.course_name.eq_ignore_ascii_case(name))
            .find_map(|c| c.course_id.clone()))
    }

    async fn insert_ap_credit(&self, credit: &ApCredit) -> RepositoryResult<()> {
        let mut state = self.state.write();
        let exists = state
            .ap_credits
            .iter()
            .any(|c| c.net_id == credit.net_id && c.course_name == credit.course_name);
        if exists {
            return Err(RepositoryError::conflict_with_context(
                format!("AP credit '{}' already recorded", credit.course_name),
                ErrorContext::new("insert_ap_credit")
                    .with_entity("ap_credit")
                    .with_entity_id(&credit.net_id),
            ));
        }
        state.ap_credits.push(credit.clone());
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for LocalRepository {
    async fn create_student(&self, student: &Student) -> RepositoryResult<()> {
        let mut state = self.state.write();
        if state.students.contains_key(&student.net_id) {
            return Err(RepositoryError::conflict_with_context(
                format!("NetID {} already exists", student.net_id),
                ErrorContext::new("create_student")
                    .with_entity("student")
                    .with_entity_id(&student.net_id),
            ));
        }
        state
            .students
            .insert(student.net_id.clone(), student.clone());
        Ok(())
    }

    async fn get_student(&self, net_id: &StudentId) -> RepositoryResult<Option<Student>> {
        Ok(self.state.read().students.get(net_id).cloned())
    }

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        Ok(self.state.read().students.values().cloned().collect())
    }

    async fn update_student(&self, student: &Student) -> RepositoryResult<()> {
        let mut state = self.state.write();
        match state.students.get_mut(&student.net_id) {
            Some(existing) => {
                *existing = student.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                format!("Student {} not found", student.net_id),
                ErrorContext::new("update_student")
                    .with_entity("student")
                    .with_entity_id(&student.net_id),
            )),
        }
    }

    async fn create_plan(
        &self,
        net_id: &StudentId,
        creation_date: NaiveDate,
    ) -> RepositoryResult<AcademicPlan> {
        let mut state = self.state.write();
        if !state.students.contains_key(net_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Student {} not found", net_id),
                ErrorContext::new("create_plan")
                    .with_entity("student")
                    .with_entity_id(net_id),
            ));
        }
        state.next_plan_id += 1;
        let plan = AcademicPlan {
            plan_id: PlanId::new(state.next_plan_id),
            net_id: net_id.clone(),
            creation_date,
        };
        state.plans.insert(plan.plan_id, plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, plan_id: PlanId) -> RepositoryResult<Option<AcademicPlan>> {
        Ok(self.state.read().plans.get(&plan_id).cloned())
    }

    async fn list_plans_for_student(
        &self,
        net_id: &StudentId,
    ) -> RepositoryResult<Vec<AcademicPlan>> {
        Ok(self
            .state
            .read()
            .plans
            .values()
            .filter(|p| &p.net_id == net_id)
            .cloned()
            .collect())
    }

    async fn delete_plan(&self, plan_id: PlanId) -> RepositoryResult<bool> {
        let mut state = self.state.write();
        if state.plans.remove(&plan_id).is_none() {
            return Ok(false);
        }
        state.planned.retain(|p| p.plan_id != plan_id);
        state.bypass_log.retain(|e| e.plan_id != plan_id);
        Ok(true)
    }

    async fn list_planned_courses(
        &self,
        plan_id: PlanId,
    ) -> RepositoryResult<Vec<PlannedCourseDetail>> {
        let state = self.state.read();
        Ok(state
            .planned
            .iter()
            .filter(|p| p.plan_id == plan_id)
            .map(|p| state.detail(p))
            .collect())
    }

    async fn list_student_planned_courses(
        &self,
        net_id: &StudentId,
    ) -> RepositoryResult<Vec<PlannedCourseDetail>> {
        let state = self.state.read();
        let owned: HashSet<PlanId> = state
            .plans
            .values()
            .filter(|p| &p.net_id == net_id)
            .map(|p| p.plan_id)
            .collect();
        Ok(state
            .planned
            .iter()
            .filter(|p| owned.contains(&p.plan_id))
            .map(|p| state.detail(p))
            .collect())
    }

    async fn insert_planned_course(
        &self,
        entry: &PlannedCourse,
        bypass: Option<&BypassLogEntry>,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write();
        let context = || {
            ErrorContext::new("insert_planned_course")
                .with_entity("planned_course")
                .with_entity_id(format!("{}/{}", entry.plan_id, entry.course_id))
        };

        if !state.plans.contains_key(&entry.plan_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Plan {} not found", entry.plan_id),
                context(),
            ));
        }
        if !state.courses.contains_key(&entry.course_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Course {} not found", entry.course_id),
                context(),
            ));
        }
        let duplicate = state
            .planned
            .iter()
            .any(|p| p.plan_id == entry.plan_id && p.course_id == entry.course_id);
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Course {} is already in plan {}",
                    entry.course_id, entry.plan_id
                ),
                context(),
            ));
        }

        if let Some(log_entry) = bypass {
            state.bypass_log.push(log_entry.clone());
        }
        state.planned.push(entry.clone());
        Ok(())
    }

    async fn delete_planned_course(
        &self,
        plan_id: PlanId,
        course_id: &CourseId,
    ) -> RepositoryResult<bool> {
        let mut state = self.state.write();
        let before = state.planned.len();
        state
            .planned
            .retain(|p| !(p.plan_id == plan_id && &p.course_id == course_id));
        Ok(state.planned.len() < before)
    }

    async fn list_bypass_log(&self, plan_id: PlanId) -> RepositoryResult<Vec<BypassLogEntry>> {
        Ok(self
            .state
            .read()
            .bypass_log
            .iter()
            .filter(|e| e.plan_id == plan_id)
            .cloned()
            .collect())
    }
}
