use once_cell::sync::Lazy;
use regex::Regex;

static SESSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{4})$").expect("Invalid session regex"));

/// 学年格式校验：形如 "2024/2025"，且后一年必须紧接前一年
pub fn validate_session(session: &str) -> Result<(), &'static str> {
    let captures = SESSION_RE
        .captures(session)
        .ok_or("Session must be in the form YYYY/YYYY")?;

    let start: i32 = captures[1].parse().map_err(|_| "Session year is invalid")?;
    let end: i32 = captures[2].parse().map_err(|_| "Session year is invalid")?;
    if end != start + 1 {
        return Err("Session years must be consecutive");
    }
    Ok(())
}

/// 成绩分量校验结果
#[derive(Debug, Clone)]
pub struct ComponentValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ComponentValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 校验五个成绩分量
///
/// 策略要求：
/// - 缺省分量视为 0，不参与校验
/// - 给出的分量必须是有限数且 >= 0
/// - 任一分量非法则整体拒绝（不做部分写入）
pub fn validate_components(
    components: &[(&'static str, Option<f64>)],
) -> ComponentValidationResult {
    let mut errors = Vec::new();

    for (name, value) in components {
        if let Some(v) = value {
            if !v.is_finite() {
                errors.push(format!("{name} must be a finite number"));
            } else if *v < 0.0 {
                errors.push(format!("{name} must not be negative"));
            }
        }
    }

    ComponentValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_session() {
        assert!(validate_session("2024/2025").is_ok());
        assert!(validate_session("1999/2000").is_ok());
    }

    #[test]
    fn test_session_bad_format() {
        assert!(validate_session("2024-2025").is_err());
        assert!(validate_session("24/25").is_err());
        assert!(validate_session("2024/2025 ").is_err());
        assert!(validate_session("").is_err());
    }

    #[test]
    fn test_session_non_consecutive_years() {
        assert!(validate_session("2024/2026").is_err());
        assert!(validate_session("2025/2024").is_err());
        assert!(validate_session("2024/2024").is_err());
    }

    #[test]
    fn test_components_all_valid() {
        let result = validate_components(&[
            ("assess_1", Some(10.0)),
            ("assess_2", None),
            ("test_1", Some(0.0)),
            ("test_2", Some(15.5)),
            ("exam", Some(40.0)),
        ]);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_components_negative_rejected() {
        let result = validate_components(&[("assess_1", Some(-1.0)), ("exam", Some(40.0))]);
        assert!(!result.is_valid);
        assert!(result.error_message().contains("assess_1"));
    }

    #[test]
    fn test_components_non_finite_rejected() {
        let result = validate_components(&[("exam", Some(f64::NAN))]);
        assert!(!result.is_valid);
        let result = validate_components(&[("exam", Some(f64::INFINITY))]);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_components_missing_treated_as_valid() {
        let result = validate_components(&[
            ("assess_1", None),
            ("assess_2", None),
            ("test_1", None),
            ("test_2", None),
            ("exam", None),
        ]);
        assert!(result.is_valid);
    }
}
