use std::str::FromStr;

use anyhow::{bail, Error};
use serde::Deserialize;

/// 日報の記述言語。
///
/// 日報中のキーワードとサマリーの見出しを切り替える。
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ja,
    En,
}

/// 勤怠行を識別するキーワード。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keywords {
    pub start: &'static str,
    pub end: &'static str,
    pub break_time: &'static str,
}

/// サマリー出力の見出し。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Labels {
    pub summary: &'static str,
    pub days: &'static str,
    pub working_hours: &'static str,
    pub estimated: &'static str,
    pub actual: &'static str,
    pub tasks: &'static str,
}

impl Lang {
    /// 日報の解析に使うキーワードを返す。
    pub fn keywords(self) -> Keywords {
        match self {
            Lang::Ja => Keywords {
                start: "始業",
                end: "終業",
                break_time: "休憩",
            },
            Lang::En => Keywords {
                start: "Start",
                end: "End",
                break_time: "Break",
            },
        }
    }

    /// サマリーの見出しを返す。
    pub fn labels(self) -> Labels {
        match self {
            Lang::Ja => Labels {
                summary: "サマリー",
                days: "日数",
                working_hours: "業務時間",
                estimated: "タスク（予定）",
                actual: "タスク（実績）",
                tasks: "タスク",
            },
            Lang::En => Labels {
                summary: "Summary",
                days: "Days",
                working_hours: "Working hours",
                estimated: "Tasks (estimated)",
                actual: "Tasks (actual)",
                tasks: "Tasks",
            },
        }
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" => Ok(Lang::Ja),
            "en" => Ok(Lang::En),
            other => bail!("Unsupported language: {} (expected ja or en)", other),
        }
    }
}
