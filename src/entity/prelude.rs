//! 预导入模块，方便使用

pub use super::class_students::{
    ActiveModel as ClassStudentActiveModel, Entity as ClassStudents, Model as ClassStudentModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::form_teachers::{
    ActiveModel as FormTeacherActiveModel, Entity as FormTeachers, Model as FormTeacherModel,
};
pub use super::result_summaries::{
    ActiveModel as ResultSummaryActiveModel, Entity as ResultSummaries,
    Model as ResultSummaryModel,
};
pub use super::schools::{
    ActiveModel as SchoolActiveModel, Entity as Schools, Model as SchoolModel,
};
pub use super::score_records::{
    ActiveModel as ScoreRecordActiveModel, Entity as ScoreRecords, Model as ScoreRecordModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::subject_enrollments::{
    ActiveModel as SubjectEnrollmentActiveModel, Entity as SubjectEnrollments,
    Model as SubjectEnrollmentModel,
};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::teaching_assignments::{
    ActiveModel as TeachingAssignmentActiveModel, Entity as TeachingAssignments,
    Model as TeachingAssignmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
