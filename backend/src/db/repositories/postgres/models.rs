use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{
    academic_plans, ap_credits, bypass_log, courses, planned_courses, prerequisites,
    requirements, students,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseRow {
    pub course_id: String,
    pub credits: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prerequisites)]
pub struct NewPrerequisiteRow {
    pub course_id: String,
    pub prerequisite_id: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = requirements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // requirement_id is only an ordering key
pub struct RequirementRow {
    pub requirement_id: i64,
    pub major_id: String,
    pub course_id: String,
    pub credits: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = requirements)]
pub struct NewRequirementRow {
    pub major_id: String,
    pub course_id: String,
    pub credits: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ap_credits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApCreditRow {
    pub net_id: String,
    pub course_name: String,
    pub score: i32,
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = students)]
#[diesel(primary_key(net_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct StudentRow {
    pub net_id: String,
    pub name: String,
    pub major_id: String,
    pub expected_graduation: Option<f64>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = academic_plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AcademicPlanRow {
    pub plan_id: i64,
    pub net_id: String,
    pub creation_date: NaiveDate,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = academic_plans)]
pub struct NewAcademicPlanRow {
    pub net_id: String,
    pub creation_date: NaiveDate,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = planned_courses)]
pub struct NewPlannedCourseRow {
    pub plan_id: i64,
    pub course_id: String,
    pub semester: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bypass_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BypassLogRow {
    pub entry_id: String,
    pub net_id: String,
    pub course_id: String,
    pub plan_id: i64,
    pub reason: String,
    pub missing_prerequisites: Vec<String>,
    pub logged_at: DateTime<Utc>,
}
