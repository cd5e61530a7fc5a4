//! Fixed survey catalogs: the scored deficiencies and the evaluated disciplines.
//!
//! Both catalogs are compile-time constants. Their order is the canonical
//! order of every table the rater produces.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The six deficiency labels printed in the survey header, in sheet order.
pub const SURVEY_DEFICIENCIES: [&str; 6] = [
    "Низкие требования (низкие требования к оцениванию, низкая сложность заданий, отсутствие дедлайнов, много пересдач)",
    "Нет командных работ (в группах)",
    "Давать неактуальные знания, изучать устаревший материал, использовать устаревшее ПО",
    "Преподаватель не имеет опыта по своему предмету, читает лекции монотонно и скучно",
    "Не идти на контакт со студентами, отказывать в объяснении, не отвечать на вопросы",
    "Не поощрять творческий подход, инициативность и  самостоятельность студентов",
];

/// Synthetic deficiency scored in the "Недостаток" label column.
pub const THEORY_DEFICIENCY: &str = "Много теории, но мало практики.";

/// Disciplines in survey row order.
pub const DISCIPLINES: [&str; 13] = [
    "Безопасность жизнедеятельности",
    "Математический анализ",
    "Алгебра",
    "Программирование",
    "Дискретная математика",
    "Профориентационный семинар",
    "Проектный семинар",
    "Практикум по основам разработки технической документации",
    "Теоретические основы информатики",
    "История России",
    "Основы российской государственности",
    "Английский язык",
    "Правовая грамотность",
];

pub const DISCIPLINE_COUNT: usize = DISCIPLINES.len();

/// Survey deficiencies plus the theory/practice column.
pub const WEIGHTED_COLUMNS: usize = SURVEY_DEFICIENCIES.len() + 1;

/// Sheet column holding the "Недостаток" header and the theory/practice scores.
pub const LABEL_COLUMN: usize = 2;

/// Sheet column of the first survey deficiency.
pub const FIRST_DEFICIENCY_COLUMN: usize = 3;

/// Where the theory/practice deficiency sits relative to the survey deficiencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TheoryPlacement {
    Leading,
    #[default]
    Trailing,
}

impl FromStr for TheoryPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leading" | "first" => Ok(Self::Leading),
            "trailing" | "last" => Ok(Self::Trailing),
            other => Err(format!(
                "unknown theory placement '{other}' (expected 'leading' or 'trailing')"
            )),
        }
    }
}

impl fmt::Display for TheoryPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leading => f.write_str("leading"),
            Self::Trailing => f.write_str("trailing"),
        }
    }
}

/// The ordered set of weighted deficiency columns.
///
/// The theory/practice deficiency is always read from [`LABEL_COLUMN`]; the
/// placement only decides whether it is listed first or last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeficiencyCatalog {
    placement: TheoryPlacement,
}

impl DeficiencyCatalog {
    pub const fn new(placement: TheoryPlacement) -> Self {
        Self { placement }
    }

    /// Deficiency labels in canonical order.
    pub fn labels(&self) -> [&'static str; WEIGHTED_COLUMNS] {
        let mut labels = [THEORY_DEFICIENCY; WEIGHTED_COLUMNS];
        let offset = self.survey_offset();
        labels[offset..offset + SURVEY_DEFICIENCIES.len()].copy_from_slice(&SURVEY_DEFICIENCIES);
        labels
    }

    /// Sheet column for each label returned by [`Self::labels`].
    pub fn sheet_columns(&self) -> [usize; WEIGHTED_COLUMNS] {
        let mut columns = [LABEL_COLUMN; WEIGHTED_COLUMNS];
        let offset = self.survey_offset();
        for (i, column) in columns[offset..offset + SURVEY_DEFICIENCIES.len()]
            .iter_mut()
            .enumerate()
        {
            *column = FIRST_DEFICIENCY_COLUMN + i;
        }
        columns
    }

    fn survey_offset(&self) -> usize {
        match self.placement {
            TheoryPlacement::Leading => 1,
            TheoryPlacement::Trailing => 0,
        }
    }
}
