use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学期
//
// 规范形式为短写（"1st"/"2nd"/"3rd"），历史数据与旧客户端
// 使用长写（"First Term"…），解析时两种形式都接受，存储只落规范短写。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub enum SchoolTerm {
    First,
    Second,
    Third,
}

impl SchoolTerm {
    pub const FIRST: &'static str = "1st";
    pub const SECOND: &'static str = "2nd";
    pub const THIRD: &'static str = "3rd";

    /// 规范短写，存储与查询统一使用
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolTerm::First => Self::FIRST,
            SchoolTerm::Second => Self::SECOND,
            SchoolTerm::Third => Self::THIRD,
        }
    }

    /// 长写形式，仅用于展示
    pub fn long_name(&self) -> &'static str {
        match self {
            SchoolTerm::First => "First Term",
            SchoolTerm::Second => "Second Term",
            SchoolTerm::Third => "Third Term",
        }
    }
}

impl<'de> Deserialize<'de> for SchoolTerm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<SchoolTerm>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的学期: '{s}'. 支持: 1st/2nd/3rd 或 First Term/Second Term/Third Term"
            ))
        })
    }
}

impl std::fmt::Display for SchoolTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SchoolTerm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1st" | "first term" | "first" => Ok(SchoolTerm::First),
            "2nd" | "second term" | "second" => Ok(SchoolTerm::Second),
            "3rd" | "third term" | "third" => Ok(SchoolTerm::Third),
            _ => Err(format!("Invalid school term: {s}")),
        }
    }
}

// 成绩记录状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub enum ScoreStatus {
    Active,
    Inactive,
}

impl<'de> Deserialize<'de> for ScoreStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "active" => Ok(ScoreStatus::Active),
            "inactive" => Ok(ScoreStatus::Inactive),
            _ => Err(serde::de::Error::custom(format!(
                "无效的成绩状态: '{s}'. 支持的状态: active, inactive"
            ))),
        }
    }
}

impl std::fmt::Display for ScoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreStatus::Active => write!(f, "active"),
            ScoreStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for ScoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ScoreStatus::Active),
            "inactive" => Ok(ScoreStatus::Inactive),
            _ => Err(format!("Invalid score status: {s}")),
        }
    }
}

// 五个成绩分量
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct ScoreComponents {
    pub assess_1: f64,
    pub assess_2: f64,
    pub test_1: f64,
    pub test_2: f64,
    pub exam: f64,
}

impl ScoreComponents {
    /// 总分恒为五个分量之和，写入时重算，绝不单独编辑
    pub fn total(&self) -> f64 {
        self.assess_1 + self.assess_2 + self.test_1 + self.test_2 + self.exam
    }
}

// 成绩记录实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct ScoreRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub session: String,
    pub term: SchoolTerm,
    #[serde(flatten)]
    #[ts(flatten)]
    pub components: ScoreComponents,
    pub total: f64,
    pub status: ScoreStatus,
    pub added_by: i64,
    pub updated_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_parses_short_forms() {
        assert_eq!("1st".parse::<SchoolTerm>().unwrap(), SchoolTerm::First);
        assert_eq!("2nd".parse::<SchoolTerm>().unwrap(), SchoolTerm::Second);
        assert_eq!("3rd".parse::<SchoolTerm>().unwrap(), SchoolTerm::Third);
    }

    #[test]
    fn test_term_parses_legacy_long_forms() {
        assert_eq!(
            "First Term".parse::<SchoolTerm>().unwrap(),
            SchoolTerm::First
        );
        assert_eq!(
            "Second Term".parse::<SchoolTerm>().unwrap(),
            SchoolTerm::Second
        );
        assert_eq!(
            "third term".parse::<SchoolTerm>().unwrap(),
            SchoolTerm::Third
        );
    }

    #[test]
    fn test_term_rejects_unknown() {
        assert!("4th".parse::<SchoolTerm>().is_err());
        assert!("".parse::<SchoolTerm>().is_err());
    }

    #[test]
    fn test_term_canonical_round_trip() {
        for term in [SchoolTerm::First, SchoolTerm::Second, SchoolTerm::Third] {
            assert_eq!(term.as_str().parse::<SchoolTerm>().unwrap(), term);
            assert_eq!(term.long_name().parse::<SchoolTerm>().unwrap(), term);
        }
    }

    #[test]
    fn test_components_total_is_exact_sum() {
        let components = ScoreComponents {
            assess_1: 10.0,
            assess_2: 10.0,
            test_1: 15.0,
            test_2: 15.0,
            exam: 40.0,
        };
        assert_eq!(components.total(), 90.0);
    }

    #[test]
    fn test_components_total_with_zero_components() {
        let components = ScoreComponents {
            assess_1: 0.0,
            assess_2: 0.0,
            test_1: 0.0,
            test_2: 0.0,
            exam: 0.0,
        };
        assert_eq!(components.total(), 0.0);
    }
}
