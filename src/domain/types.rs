// ==========================================
// 员工名录服务 - 领域类型定义
// ==========================================
// 职责: 职位/专业方向/城市/国家四个封闭取值集合
// 规则: 输入宽松（大小写/空白），输出严格（规范标签）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ClosedSet - 封闭取值集合
// ==========================================
// 实现者: Position / Specialization / City / Country
pub trait ClosedSet: Sized + Copy + 'static {
    /// 全部取值（按规范顺序）
    const ALL: &'static [Self];

    /// 规范标签
    fn label(&self) -> &'static str;

    /// 按规范标签精确匹配
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }

    /// 忽略大小写匹配（调用方负责 TRIM）
    fn from_label_ignore_case(value: &str) -> Option<Self> {
        let lowered = value.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().to_lowercase() == lowered)
    }

    /// 允许取值列表（用于错误提示）
    fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ==========================================
// 职位 (Position)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Менеджер")]
    Manager,
    #[serde(rename = "Senior-разработчик")]
    Senior,
    #[serde(rename = "Middle-разработчик")]
    Middle,
    #[serde(rename = "Junior-разработчик")]
    Junior,
}

impl ClosedSet for Position {
    const ALL: &'static [Self] = &[
        Position::Manager,
        Position::Senior,
        Position::Middle,
        Position::Junior,
    ];

    fn label(&self) -> &'static str {
        match self {
            Position::Manager => "Менеджер",
            Position::Senior => "Senior-разработчик",
            Position::Middle => "Middle-разработчик",
            Position::Junior => "Junior-разработчик",
        }
    }
}

// ==========================================
// 专业方向 (Specialization)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    Python,
    DevOps,
}

impl ClosedSet for Specialization {
    const ALL: &'static [Self] = &[Specialization::Python, Specialization::DevOps];

    fn label(&self) -> &'static str {
        match self {
            Specialization::Python => "Python",
            Specialization::DevOps => "DevOps",
        }
    }
}

// ==========================================
// 城市 (City)
// ==========================================
// 与 location.city 自然键一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Москва")]
    Moscow,
    #[serde(rename = "Санкт-Петербург")]
    SaintPetersburg,
    #[serde(rename = "Париж")]
    Paris,
}

impl ClosedSet for City {
    const ALL: &'static [Self] = &[City::Moscow, City::SaintPetersburg, City::Paris];

    fn label(&self) -> &'static str {
        match self {
            City::Moscow => "Москва",
            City::SaintPetersburg => "Санкт-Петербург",
            City::Paris => "Париж",
        }
    }
}

// ==========================================
// 国家 (Country)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "Россия")]
    Russia,
    #[serde(rename = "Франция")]
    France,
}

impl ClosedSet for Country {
    const ALL: &'static [Self] = &[Country::Russia, Country::France];

    fn label(&self) -> &'static str {
        match self {
            Country::Russia => "Россия",
            Country::France => "Франция",
        }
    }
}

macro_rules! impl_label_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

impl_label_display!(Position, Specialization, City, Country);

/// 部署时预置的工作地点（城市 → 国家）
pub const SEEDED_LOCATIONS: &[(City, Country)] = &[
    (City::Moscow, Country::Russia),
    (City::SaintPetersburg, Country::Russia),
    (City::Paris, Country::France),
];
