//! User-facing text. Japanese is the primary locale of the deployment.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Japanese,
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" | "japanese" => Ok(Locale::Japanese),
            "en" | "en-us" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl Locale {
    pub fn search_failed(self) -> &'static str {
        match self {
            Locale::Japanese => "エラーが発生しました。もう一度お試しください。",
            Locale::English => "Something went wrong. Please try again.",
        }
    }

    pub fn preview_not_ready(self) -> &'static str {
        match self {
            Locale::Japanese => "ファイルがまだアップロード中、または処理に失敗しています。\n管理画面でファイルのステータスを確認してください。",
            Locale::English => "The file is still uploading or failed processing.\nCheck the file status on the admin screen.",
        }
    }

    pub fn preview_not_found(self) -> &'static str {
        match self {
            Locale::Japanese => "ドキュメントが見つかりません。\nファイルが削除された可能性があります。",
            Locale::English => "Document not found.\nThe file may have been deleted.",
        }
    }

    pub fn preview_generic(self) -> &'static str {
        match self {
            Locale::Japanese => "ファイルのプレビューURLの取得に失敗しました",
            Locale::English => "Failed to get the preview URL for this file",
        }
    }

    pub fn preview_timed_out(self) -> &'static str {
        match self {
            Locale::Japanese => "プレビューURLの取得がタイムアウトしました",
            Locale::English => "Timed out while getting the preview URL",
        }
    }

    pub fn example_queries(self) -> &'static [&'static str] {
        match self {
            Locale::Japanese => &[
                "りんごプレザーブ耐熱性付与",
                "ドーナツの吸油抑制",
                "カルボナーラソース",
                "野菜の離水防止剤",
            ],
            Locale::English => &[
                "apple preserve heat resistance",
                "reduce oil absorption in doughnuts",
                "carbonara sauce",
                "anti-syneresis agent for vegetables",
            ],
        }
    }
}
