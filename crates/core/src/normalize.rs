//! Garment label normalization
//!
//! Survey answers use many spellings and fabric variants for the same
//! garment. Both slots collapse them onto a small canonical vocabulary
//! before label spaces are fitted. Each label is looked up once; unknown
//! labels pass through unchanged.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentSlot {
    Top,
    Bottom,
}

impl GarmentSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Top => TOP_LABELS,
            Self::Bottom => BOTTOM_LABELS,
        }
    }
}

impl fmt::Display for GarmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GarmentSlot {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown garment slot `{other}`; expected top or bottom")),
        }
    }
}

const TOP_LABELS: &[(&str, &str)] = &[
    ("패딩", "패딩"),
    ("롱패딩", "패딩"),
    ("야상", "재킷"),
    ("롱코트", "코트"),
    ("더블 코트", "코트"),
    ("숏패딩", "패딩"),
    ("무스탕", "재킷"),
    ("오리털 점퍼", "패딩"),
    ("누빔 점퍼", "패딩"),
    ("반팔티", "반팔 티셔츠"),
    ("누빔 코트", "코트"),
    ("코트", "코트"),
    ("패딩 조끼", "패딩"),
    ("구스다운 점퍼", "패딩"),
    ("구스다운 코트", "코트"),
    ("다운 자켓", "패딩"),
    ("반팔 셔츠", "반팔 티셔츠"),
    ("민소매", "반팔 티셔츠"),
    ("오버핏 패딩", "패딩"),
    ("티셔츠", "긴팔 티셔츠"),
    ("오리털 롱패딩", "패딩"),
    ("패딩조끼", "패딩"),
    ("후드 집업", "후드 집업"),
    ("맨투맨", "맨투맨/스웨트"),
    ("바람막이", "가디건"),
    ("폴로셔츠", "셔츠/블라우스"),
    ("오버사이즈 패딩", "패딩"),
    ("가디건", "가디건"),
    ("긴팔티", "긴팔 티셔츠"),
    ("니트", "니트/스웨터"),
    ("나시티", "반팔 티셔츠"),
    ("데님 자켓", "재킷"),
    ("구스다운 패딩", "패딩"),
    ("후드티", "후드"),
    ("롱 무스탕", "코트"),
    ("블레이저", "재킷"),
    ("울 롱코트", "코트"),
    ("울 코트", "코트"),
    ("코치자켓", "재킷"),
    ("패딩 야상", "패딩"),
    ("패딩 코트", "패딩"),
    ("린넨 반팔셔츠", "반팔 티셔츠"),
    ("셔츠", "셔츠/블라우스"),
    ("자켓", "재킷"),
    ("긴팔 셔츠", "셔츠/블라우스"),
    ("린넨 셔츠", "셔츠/블라우스"),
    ("블루종", "가디건"),
    ("얇은 가디건", "가디건"),
    ("울 가디건", "가디건"),
    ("트렌치코트", "코트"),
    ("MA-1 야상", "재킷"),
    ("가죽 자켓", "재킷"),
    ("가죽자켓", "재킷"),
    ("긴팔 맨투맨", "맨투맨"),
    ("다운 재킷", "재킷"),
    ("롱 코트", "코트"),
    ("린넨 티셔츠", "셔츠/블라우스"),
    ("린넨티", "셔츠/블라우스"),
    ("바람막이 자켓", "가디건"),
    ("바람막이 점퍼", "가디건"),
    ("얇은 자켓", "재킷"),
    ("후드", "후드"),
];

const BOTTOM_LABELS: &[(&str, &str)] = &[
    ("면바지", "면바지"),
    ("청바지", "청바지"),
    ("기모바지", "면바지"),
    ("카고팬츠", "면바지"),
    ("기모 청바지", "청바지"),
    ("슬랙스", "슈트/슬랙스"),
    ("치노팬츠", "면바지"),
    ("조거팬츠", "트레이닝/조거 팬츠"),
    ("기모 슬랙스", "슈트/슬랙스"),
    ("반바지", "반바지"),
    ("면반바지", "반바지"),
    ("청반바지", "반바지"),
    ("기모 레깅스", "레깅스"),
    ("기모 조거팬츠", "트레이닝/조거 팬츠"),
    ("두꺼운 청바지", "청바지"),
    ("울 카고팬츠", "면바지"),
    ("치노 반바지", "반바지"),
    ("기모 스킨", "레깅스"),
    ("두꺼운 레깅스", "레깅스"),
    ("두꺼운 슬랙스", "슈트/슬랙스"),
    ("린넨 반바지", "반바지"),
    ("기모 카고팬츠", "면바지"),
    ("기모 팬츠", "면바지"),
    ("코듀로이 팬츠", "면바지"),
    ("코튼 반바지", "반바지"),
    ("기모 트레이닝팬츠", "트레이닝/조거 팬츠"),
    ("방한 팬츠", "면바지"),
];

/// Canonical spelling for `raw`, or the trimmed input when no rule matches.
pub fn normalize_label(slot: GarmentSlot, raw: &str) -> Cow<'static, str> {
    let trimmed = raw.trim();
    match slot.table().iter().find(|(source, _)| *source == trimmed) {
        Some((_, canonical)) => Cow::Borrowed(canonical),
        None => Cow::Owned(trimmed.to_string()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub slot: GarmentSlot,
    pub labels: Vec<String>,
    /// Inputs rewritten to a different spelling
    pub changed: usize,
    pub unchanged: usize,
}

pub fn normalize_batch<I, S>(slot: GarmentSlot, labels: I) -> NormalizationReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = NormalizationReport { slot, labels: Vec::new(), changed: 0, unchanged: 0 };
    for raw in labels {
        let raw = raw.as_ref();
        let normalized = normalize_label(slot, raw);
        if normalized == raw {
            report.unchanged += 1;
        } else {
            report.changed += 1;
        }
        report.labels.push(normalized.into_owned());
    }
    report
}

/// Distinct canonical labels for `slot`, sorted.
pub fn canonical_labels(slot: GarmentSlot) -> Vec<&'static str> {
    slot.table().iter().map(|(_, canonical)| *canonical).collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{canonical_labels, normalize_batch, normalize_label, GarmentSlot};

    #[test]
    fn variants_collapse_to_canonical_names() {
        assert_eq!(normalize_label(GarmentSlot::Top, "롱패딩"), "패딩");
        assert_eq!(normalize_label(GarmentSlot::Top, "야상"), "재킷");
        assert_eq!(normalize_label(GarmentSlot::Top, "  롱코트 "), "코트");
        assert_eq!(normalize_label(GarmentSlot::Bottom, "기모 청바지"), "청바지");
        assert_eq!(normalize_label(GarmentSlot::Bottom, "조거팬츠"), "트레이닝/조거 팬츠");
    }

    #[test]
    fn slots_use_separate_tables() {
        assert_eq!(normalize_label(GarmentSlot::Top, "청반바지"), "청반바지");
        assert_eq!(normalize_label(GarmentSlot::Bottom, "청반바지"), "반바지");
    }

    #[test]
    fn unknown_labels_pass_through_trimmed() {
        let label = normalize_label(GarmentSlot::Bottom, " 롱스커트 ");
        assert_eq!(label, "롱스커트");
        assert!(matches!(label, Cow::Owned(_)));
    }

    #[test]
    fn batch_counts_rewrites() {
        let report = normalize_batch(GarmentSlot::Bottom, ["청바지", "면반바지", "치마", "슬랙스"]);

        assert_eq!(report.labels, vec!["청바지", "반바지", "치마", "슈트/슬랙스"]);
        assert_eq!(report.changed, 2);
        assert_eq!(report.unchanged, 2);
    }

    #[test]
    fn canonical_labels_are_sorted_and_distinct() {
        let bottoms = canonical_labels(GarmentSlot::Bottom);
        assert_eq!(
            bottoms,
            vec!["레깅스", "면바지", "반바지", "슈트/슬랙스", "청바지", "트레이닝/조거 팬츠"]
        );

        let tops = canonical_labels(GarmentSlot::Top);
        assert!(tops.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(tops.len(), 12);
        // one pass only: "긴팔 맨투맨" lands on "맨투맨", which is itself a source spelling
        assert_eq!(normalize_label(GarmentSlot::Top, "긴팔 맨투맨"), "맨투맨");
        assert_eq!(normalize_label(GarmentSlot::Top, "맨투맨"), "맨투맨/스웨트");
    }

    #[test]
    fn slot_parses_case_insensitively() {
        assert_eq!("TOP".parse::<GarmentSlot>(), Ok(GarmentSlot::Top));
        assert_eq!(" bottom".parse::<GarmentSlot>(), Ok(GarmentSlot::Bottom));
        assert!("shoes".parse::<GarmentSlot>().is_err());
    }
}
