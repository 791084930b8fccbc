use serde::{Deserialize, Deserializer};
use ts_rs::TS;

use crate::models::scores::entities::SchoolTerm;

// 自定义反序列化函数：成绩分量兼容数字、数字字符串与空串
// （旧客户端以表单字符串提交，空串视为未填写）
fn deserialize_component<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawComponent {
        Number(f64),
        Text(String),
    }

    match Option::<RawComponent>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawComponent::Number(n)) => Ok(Some(n)),
        Some(RawComponent::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("无效的成绩分量: '{s}'")))
        }
    }
}

/// 录入成绩请求
///
/// 五个分量均可缺省，缺省视为 0；学期接受短写与长写
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct SaveScoreRequest {
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub session: String,
    pub term: SchoolTerm,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub assess_1: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub assess_2: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub test_1: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub test_2: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub exam: Option<f64>,
}

/// 更新成绩请求（按记录 ID 覆盖五个分量）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct UpdateScoreRequest {
    #[serde(default, deserialize_with = "deserialize_component")]
    pub assess_1: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub assess_2: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub test_1: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub test_2: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_component")]
    pub exam: Option<f64>,
}

/// 同批（cohort）视图查询参数
///
/// session/term 可省略，省略时跨全部学年/学期聚合
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct CohortQueryParams {
    pub class_id: i64,
    pub subject_id: i64,
    pub session: Option<String>,
    pub term: Option<SchoolTerm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_accept_numbers_and_strings() {
        let req: SaveScoreRequest = serde_json::from_str(
            r#"{"student_id":1,"class_id":2,"subject_id":3,"session":"2024/2025",
                "term":"1st","assess_1":10,"assess_2":"9.5","test_1":"","exam":null}"#,
        )
        .unwrap();
        assert_eq!(req.assess_1, Some(10.0));
        assert_eq!(req.assess_2, Some(9.5));
        assert_eq!(req.test_1, None);
        assert_eq!(req.test_2, None);
        assert_eq!(req.exam, None);
    }

    #[test]
    fn test_components_reject_non_numeric_text() {
        let result = serde_json::from_str::<SaveScoreRequest>(
            r#"{"student_id":1,"class_id":2,"subject_id":3,"session":"2024/2025",
                "term":"1st","exam":"forty"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_term_accepts_long_form() {
        let req: SaveScoreRequest = serde_json::from_str(
            r#"{"student_id":1,"class_id":2,"subject_id":3,"session":"2024/2025",
                "term":"Second Term"}"#,
        )
        .unwrap();
        assert_eq!(req.term, SchoolTerm::Second);
    }
}
