use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 业务错误码
// 约定：HTTP 状态码 * 100 + 两位业务序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/error-code.ts")]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 40000,
    InvalidScoreComponent = 40001,
    InvalidSession = 40002,
    InvalidTerm = 40003,

    Unauthorized = 40100,
    AuthFailed = 40101,

    Forbidden = 40300,
    NotSubjectTeacher = 40301,
    NotFormTeacher = 40302,

    NotFound = 40400,
    StudentNotEnrolled = 40401,
    ScoreNotFound = 40402,
    ClassNotFound = 40403,
    UserNotFound = 40404,

    Conflict = 40900,
    ResultsLocked = 40901,

    InternalServerError = 50000,
}
