//! 同批（cohort）聚合计算
//!
//! 纯内存计算：存储层取数后在此合并，算出每个学生的总分、同批人数、
//! 平均分与密集名次。所有派生值均为读时计算，不做任何缓存，
//! 因此永远不会过期，代价是每次读取随同批规模线性增长。

use std::collections::{HashMap, HashSet};

use crate::models::rosters::entities::{ClassMembership, Student};
use crate::models::scores::entities::ScoreRecord;
use crate::models::scores::responses::CohortViewRow;

/// 同批成员：在册且选课的学生，total 为其有效成绩总分（未录分为 None）
#[derive(Debug, Clone)]
pub struct CohortMember {
    pub student_id: i64,
    pub class_group: Option<String>,
    pub total: Option<f64>,
}

/// 分组标签 null-safe 相等：两个 None 匹配，None 与 Some 不匹配
pub fn group_matches(a: Option<&str>, b: Option<&str>) -> bool {
    a == b
}

/// 保留两位小数（仅展示层使用，存储永远保存精确值）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 已录分总分的算术平均；无人录分为 None（绝不以 0 充当平均分）
pub fn cohort_average(totals: &[f64]) -> Option<f64> {
    if totals.is_empty() {
        None
    } else {
        Some(totals.iter().sum::<f64>() / totals.len() as f64)
    }
}

/// 密集名次：按总分降序，并列共享名次，下一个不同总分名次恰好加一
///
/// 名次 = 比该总分更高的不同总分个数 + 1
pub fn dense_position(peer_totals: &[f64], total: f64) -> i64 {
    let mut distinct: Vec<f64> = peer_totals.to_vec();
    distinct.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    (distinct.iter().take_while(|v| **v > total).count() as i64) + 1
}

/// 由成员关系、选课与成绩记录组装同批成员
///
/// 同批 = 有效班级成员 ∩ 有效选课学生。成绩按学生累加，
/// 跨学年/学期读取（过滤条件省略）时多条记录合并为一个总分。
pub fn build_cohort_members(
    memberships: &[ClassMembership],
    enrolled_student_ids: &HashSet<i64>,
    records: &[ScoreRecord],
) -> Vec<CohortMember> {
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.student_id).or_insert(0.0) += record.total;
    }

    let mut seen: HashSet<i64> = HashSet::new();
    memberships
        .iter()
        .filter(|m| enrolled_student_ids.contains(&m.student_id))
        .filter(|m| seen.insert(m.student_id))
        .map(|m| CohortMember {
            student_id: m.student_id,
            class_group: m.class_group.clone(),
            total: totals.get(&m.student_id).copied(),
        })
        .collect()
}

/// 为每个成员计算四项派生值，各成员的同批以其自身分组界定
///
/// 返回行按总分降序排列，未录分的学生排在最后
pub fn compute_rows(
    members: &[CohortMember],
    students: &HashMap<i64, Student>,
) -> Vec<CohortViewRow> {
    let mut rows: Vec<CohortViewRow> = members
        .iter()
        .filter_map(|member| {
            // 学生主记录已失效时跳过该行
            let student = students.get(&member.student_id)?.clone();

            let peers: Vec<&CohortMember> = members
                .iter()
                .filter(|peer| {
                    group_matches(member.class_group.as_deref(), peer.class_group.as_deref())
                })
                .collect();

            let scored: Vec<f64> = peers.iter().filter_map(|peer| peer.total).collect();

            Some(CohortViewRow {
                student,
                class_group: member.class_group.clone(),
                total: member.total,
                total_students: peers.len() as i64,
                avg_total: cohort_average(&scored).map(round2),
                position: member.total.map(|t| dense_position(&scored, t)),
            })
        })
        .collect();

    rows.sort_by(|a, b| match (b.total, a.total) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (None, None) => std::cmp::Ordering::Equal,
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(student_id: i64, class_group: Option<&str>, total: Option<f64>) -> CohortMember {
        CohortMember {
            student_id,
            class_group: class_group.map(|g| g.to_string()),
            total,
        }
    }

    fn student(id: i64) -> Student {
        Student {
            id,
            school_id: 1,
            first_name: "Student".to_string(),
            surname: format!("No{id}"),
        }
    }

    fn student_map(ids: &[i64]) -> HashMap<i64, Student> {
        ids.iter().map(|id| (*id, student(*id))).collect()
    }

    fn row_for(rows: &[CohortViewRow], student_id: i64) -> &CohortViewRow {
        rows.iter()
            .find(|r| r.student.id == student_id)
            .expect("row missing")
    }

    #[test]
    fn test_group_matches_is_null_safe() {
        assert!(group_matches(None, None));
        assert!(group_matches(Some("A"), Some("A")));
        assert!(!group_matches(None, Some("A")));
        assert!(!group_matches(Some("A"), None));
        assert!(!group_matches(Some("A"), Some("B")));
    }

    #[test]
    fn test_dense_position_shares_rank_on_ties() {
        // 总分 [90, 90, 80]：两个 90 并列第 1，80 名次为 2 而非 3
        let totals = [90.0, 90.0, 80.0];
        assert_eq!(dense_position(&totals, 90.0), 1);
        assert_eq!(dense_position(&totals, 80.0), 2);
    }

    #[test]
    fn test_dense_position_no_gaps() {
        let totals = [100.0, 100.0, 95.0, 95.0, 90.0];
        assert_eq!(dense_position(&totals, 100.0), 1);
        assert_eq!(dense_position(&totals, 95.0), 2);
        assert_eq!(dense_position(&totals, 90.0), 3);
    }

    #[test]
    fn test_cohort_average_excludes_unscored() {
        // 5 名在册学生，仅 3 人录分：平均分除以 3 而非 5
        let members = vec![
            member(1, Some("A"), Some(60.0)),
            member(2, Some("A"), Some(70.0)),
            member(3, Some("A"), Some(80.0)),
            member(4, Some("A"), None),
            member(5, Some("A"), None),
        ];
        let rows = compute_rows(&members, &student_map(&[1, 2, 3, 4, 5]));

        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(row.total_students, 5);
            assert_eq!(row.avg_total, Some(70.0));
        }
        assert_eq!(row_for(&rows, 4).position, None);
        assert_eq!(row_for(&rows, 5).total, None);
    }

    #[test]
    fn test_empty_cohort_average_is_none() {
        assert_eq!(cohort_average(&[]), None);

        let members = vec![member(1, Some("A"), None), member(2, Some("A"), None)];
        let rows = compute_rows(&members, &student_map(&[1, 2]));
        for row in &rows {
            assert_eq!(row.avg_total, None);
            assert_eq!(row.position, None);
            assert_eq!(row.total_students, 2);
        }
    }

    #[test]
    fn test_rows_scoped_by_member_group() {
        let members = vec![
            member(1, Some("A"), Some(90.0)),
            member(2, Some("A"), Some(50.0)),
            member(3, Some("B"), Some(70.0)),
            member(4, None, Some(40.0)),
        ];
        let rows = compute_rows(&members, &student_map(&[1, 2, 3, 4]));

        // A 组两人互为同批
        assert_eq!(row_for(&rows, 1).total_students, 2);
        assert_eq!(row_for(&rows, 1).position, Some(1));
        assert_eq!(row_for(&rows, 2).position, Some(2));
        // B 组单人成批
        assert_eq!(row_for(&rows, 3).total_students, 1);
        assert_eq!(row_for(&rows, 3).position, Some(1));
        assert_eq!(row_for(&rows, 3).avg_total, Some(70.0));
        // 无分组学生只与无分组学生同批
        assert_eq!(row_for(&rows, 4).total_students, 1);
        assert_eq!(row_for(&rows, 4).position, Some(1));
    }

    #[test]
    fn test_build_cohort_members_intersects_roster_and_enrollment() {
        let memberships = vec![
            ClassMembership {
                student_id: 1,
                class_id: 10,
                class_group: Some("A".to_string()),
                session: "2024/2025".to_string(),
            },
            ClassMembership {
                student_id: 2,
                class_id: 10,
                class_group: Some("A".to_string()),
                session: "2024/2025".to_string(),
            },
        ];
        // 学生 2 没有选课，不进入同批
        let enrolled: HashSet<i64> = [1].into_iter().collect();

        let members = build_cohort_members(&memberships, &enrolled, &[]);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].student_id, 1);
        assert_eq!(members[0].total, None);
    }

    #[test]
    fn test_scenario_two_students_ranked() {
        // 端到端场景：S1 总分 90 名次 1，S2 总分 85 名次 2，平均 87.5
        let members = vec![
            member(1, Some("A"), Some(90.0)),
            member(2, Some("A"), Some(85.0)),
        ];
        let rows = compute_rows(&members, &student_map(&[1, 2]));

        assert_eq!(rows.len(), 2);
        // 行按总分降序
        assert_eq!(rows[0].student.id, 1);
        assert_eq!(rows[0].position, Some(1));
        assert_eq!(rows[1].student.id, 2);
        assert_eq!(rows[1].position, Some(2));
        for row in &rows {
            assert_eq!(row.total_students, 2);
            assert_eq!(row.avg_total, Some(87.5));
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.5), 87.5);
        assert_eq!(round2(70.0 / 3.0 * 3.0), 70.0);
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
    }

    #[test]
    fn test_inactive_student_rows_are_skipped() {
        let members = vec![
            member(1, Some("A"), Some(90.0)),
            member(2, Some("A"), Some(85.0)),
        ];
        // 学生 2 的主记录已失效，不在学生表查询结果中
        let rows = compute_rows(&members, &student_map(&[1]));
        assert_eq!(rows.len(), 1);
        // 同批人数仍按成员关系计算
        assert_eq!(rows[0].total_students, 2);
    }
}
